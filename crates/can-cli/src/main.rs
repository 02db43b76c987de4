//! `can-staging`: stage, review and apply pending CAN edits from a shell
//!
//! Every invocation restores the store from the slot file, runs one
//! command, and leaves the slot as the persistence bridge wrote it.

mod commands;
mod config;
mod ledger;
mod logging;

use anyhow::{Context, Result};
use can_core::BatchReconciler;
use can_record::{ArrivalDate, ArrivalStatus};
use can_staging::{FileChannel, StagingStore};
use clap::{value_parser, Arg, ArgMatches, Command};
use commands::{parse_date, parse_warehouse, StageArgs};
use config::CliConfig;
use ledger::{LedgerUpdater, LogNotifier};
use std::path::PathBuf;

fn parse_status(text: &str) -> Result<ArrivalStatus, can_record::RecordError> {
    text.parse()
}

fn document_arg() -> Arg {
    Arg::new("document")
        .long("document")
        .required(true)
        .help("Arrival note number, e.g. CAN-100")
}

fn cli() -> Command {
    Command::new("can-staging")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Pending-change staging for container arrival notes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("slot")
                .long("slot")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Slot file holding the persisted changes [default: <query_param>.json]"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config with [staging], [modifier] and [owners] tables"),
        )
        .subcommand(
            Command::new("stage")
                .about("Stage a change for one arrival line")
                .arg(document_arg())
                .arg(
                    Arg::new("line")
                        .long("line")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Arrival line id"),
                )
                .arg(
                    Arg::new("from-date")
                        .long("from-date")
                        .value_parser(parse_date)
                        .help("Current arrival date (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("to-date")
                        .long("to-date")
                        .value_parser(parse_date)
                        .help("New arrival date (YYYY-MM-DD, or 'none' to clear)"),
                )
                .arg(
                    Arg::new("from-status")
                        .long("from-status")
                        .default_value("REQUEST_STATUS")
                        .value_parser(parse_status)
                        .help("Current status"),
                )
                .arg(
                    Arg::new("to-status")
                        .long("to-status")
                        .value_parser(parse_status)
                        .help("New status"),
                )
                .arg(
                    Arg::new("from-warehouse")
                        .long("from-warehouse")
                        .value_parser(parse_warehouse)
                        .help("Current warehouse as ID:NAME"),
                )
                .arg(
                    Arg::new("to-warehouse")
                        .long("to-warehouse")
                        .value_parser(parse_warehouse)
                        .help("New warehouse as ID:NAME"),
                )
                .arg(
                    Arg::new("reason")
                        .long("reason")
                        .required(true)
                        .help("Why the change is needed"),
                )
                .arg(Arg::new("product").long("product").help("Product name"))
                .arg(Arg::new("vendor").long("vendor").help("Vendor name")),
        )
        .subcommand(
            Command::new("remove")
                .about("Drop the staged change for a document")
                .arg(document_arg()),
        )
        .subcommand(Command::new("list").about("List staged changes"))
        .subcommand(
            Command::new("show")
                .about("Print one staged change as JSON")
                .arg(document_arg()),
        )
        .subcommand(Command::new("clear").about("Drop every staged change"))
        .subcommand(Command::new("owners").about("Group staged changes by owner"))
        .subcommand(
            Command::new("apply")
                .about("Apply every staged change and notify owners")
                .arg(
                    Arg::new("ledger")
                        .long("ledger")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON-lines file receiving applied updates"),
                ),
        )
}

fn stage_args(args: &ArgMatches) -> Result<StageArgs> {
    Ok(StageArgs {
        document_number: args
            .get_one::<String>("document")
            .context("--document is required")?
            .clone(),
        line_id: *args.get_one::<i64>("line").context("--line is required")?,
        from_date: args
            .get_one::<Option<ArrivalDate>>("from-date")
            .cloned()
            .flatten(),
        to_date: args.get_one::<Option<ArrivalDate>>("to-date").cloned(),
        from_status: args
            .get_one::<ArrivalStatus>("from-status")
            .copied()
            .unwrap_or_default(),
        to_status: args.get_one::<ArrivalStatus>("to-status").copied(),
        from_warehouse: args.get_one::<(i64, String)>("from-warehouse").cloned(),
        to_warehouse: args.get_one::<(i64, String)>("to-warehouse").cloned(),
        reason: args
            .get_one::<String>("reason")
            .cloned()
            .unwrap_or_default(),
        product_name: args.get_one::<String>("product").cloned(),
        vendor_name: args.get_one::<String>("vendor").cloned(),
    })
}

fn document(args: &ArgMatches) -> Result<&str> {
    args.get_one::<String>("document")
        .map(String::as_str)
        .context("--document is required")
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let matches = cli().get_matches();
    let config = CliConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let slot = matches
        .get_one::<PathBuf>("slot")
        .cloned()
        .unwrap_or_else(|| config.default_slot());
    tracing::debug!(slot = %slot.display(), "opening staging store");

    let mut store = StagingStore::open(FileChannel::new(slot), &config.staging);
    let mut out = std::io::stdout().lock();

    match matches.subcommand() {
        Some(("stage", args)) => commands::stage(&mut store, &stage_args(args)?, &mut out),
        Some(("remove", args)) => commands::remove(&mut store, document(args)?, &mut out),
        Some(("list", _)) => commands::list(&store, &mut out),
        Some(("show", args)) => commands::show(&store, document(args)?, &mut out),
        Some(("clear", _)) => commands::clear(&mut store, &mut out),
        Some(("owners", _)) => commands::owners(&store, &config.owners, &mut out),
        Some(("apply", args)) => {
            let ledger = args
                .get_one::<PathBuf>("ledger")
                .context("--ledger is required")?;
            let reconciler = BatchReconciler::new(
                LedgerUpdater::new(ledger),
                LogNotifier,
                config.owners.clone(),
            );
            let report = commands::apply(&mut store, &reconciler, &config.modifier, &mut out).await?;
            if report.failed_count() > 0 {
                anyhow::bail!("{} change(s) left staged", report.failed_count());
            }
            Ok(())
        }
        _ => anyhow::bail!("no command given, see --help"),
    }
}
