//! Owner grouping for notifications
//!
//! The resolver is supplied by the data access layer; the store never looks
//! owners up on its own.

use can_record::ChangeRecord;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// Maps a document number to the email of its owner
pub trait OwnerResolver {
    /// Owner email, or `None` when the document has no known owner
    fn resolve_owner(&self, document_number: &str) -> Option<String>;
}

impl<F> OwnerResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    #[inline]
    fn resolve_owner(&self, document_number: &str) -> Option<String> {
        self(document_number)
    }
}

impl OwnerResolver for BTreeMap<String, String> {
    #[inline]
    fn resolve_owner(&self, document_number: &str) -> Option<String> {
        self.get(document_number).cloned()
    }
}

impl OwnerResolver for HashMap<String, String> {
    #[inline]
    fn resolve_owner(&self, document_number: &str) -> Option<String> {
        self.get(document_number).cloned()
    }
}

/// Records grouped by owner email, in first-seen order
pub type OwnerGroups = IndexMap<String, Vec<ChangeRecord>>;

/// Partition records by owner
///
/// Documents without an owner (or with a blank one) are left out.
pub fn group_by_owner<'a, I, R>(records: I, resolver: &R) -> OwnerGroups
where
    I: IntoIterator<Item = &'a ChangeRecord>,
    R: OwnerResolver + ?Sized,
{
    let mut groups = OwnerGroups::new();
    for record in records {
        match resolver.resolve_owner(record.document_number()) {
            Some(owner) if !owner.trim().is_empty() => {
                groups.entry(owner).or_default().push(record.clone());
            }
            _ => {
                tracing::debug!(
                    document = record.document_number(),
                    "no owner for document, skipping"
                );
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_test_utils::record;

    #[test]
    fn groups_preserve_record_order() {
        let records = [record("CAN-1"), record("CAN-2"), record("CAN-3")];
        let owners: BTreeMap<String, String> = [
            ("CAN-1", "a@example.com"),
            ("CAN-2", "b@example.com"),
            ("CAN-3", "a@example.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let groups = group_by_owner(&records, &owners);
        assert_eq!(groups.len(), 2);
        let a: Vec<&str> = groups["a@example.com"]
            .iter()
            .map(ChangeRecord::document_number)
            .collect();
        assert_eq!(a, vec!["CAN-1", "CAN-3"]);
    }

    #[test]
    fn unowned_documents_are_excluded() {
        let records = [record("CAN-1"), record("CAN-2")];
        let resolver = |doc: &str| match doc {
            "CAN-1" => Some(String::new()),
            _ => None,
        };
        assert!(group_by_owner(&records, &resolver).is_empty());
    }
}
