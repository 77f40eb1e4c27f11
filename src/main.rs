// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use serde_json::json;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use entity_ledger::{
    AccruingRecord, BorrowableRecord, Event, Format, Journal, LedgerConfig, MeteredRecord,
    PlainRecord, Record, RecordId, Registry, SupervisoryRecord,
};

const ACTOR: &str = "cli";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = LedgerConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] => run_ui_mode(&config)?,
        ["demo"] => run_demo(&config)?,
        ["list"] => run_list(&config, None)?,
        ["list", order] => run_list(&config, Some(*order))?,
        ["find", key] => run_find(&config, key)?,
        ["search", query] => run_search(&config, query)?,
        ["total"] => run_total(&config)?,
        ["transfer", from, to, amount] => {
            run_transfer(&config, parse_id(from)?, parse_id(to)?, parse_amount(amount)?)?
        }
        ["accrue", id] => run_accrue(&config, parse_id(id)?)?,
        ["issue", id, user, password] => {
            run_loan(&config, LoanAction::Issue, parse_id(id)?, user, password)?
        }
        ["return", id, user, password] => {
            run_loan(&config, LoanAction::Return, parse_id(id)?, user, password)?
        }
        ["history", id] => run_history(&config, parse_id(id)?)?,
        ["convert", format] => run_convert(&config, format, None)?,
        ["convert", format, output] => run_convert(&config, format, Some(PathBuf::from(*output)))?,
        _ => print_usage(),
    }

    Ok(())
}

fn print_usage() {
    println!("Entity Ledger v{}", entity_ledger::VERSION);
    println!();
    println!("Usage:");
    println!("  entity-ledger                          browse records (TUI)");
    println!("  entity-ledger demo                     write a sample registry");
    println!("  entity-ledger list [age|value|name]    print records");
    println!("  entity-ledger find <id|name>");
    println!("  entity-ledger search <text>");
    println!("  entity-ledger total");
    println!("  entity-ledger transfer <from> <to> <amount>");
    println!("  entity-ledger accrue <id>");
    println!("  entity-ledger issue <id> <user> <password>");
    println!("  entity-ledger return <id> <user> <password>");
    println!("  entity-ledger history <id>");
    println!("  entity-ledger convert <legacy|tagged> [output]");
    println!();
    println!("Config file: ${}", entity_ledger::config::CONFIG_ENV);
}

// ============================================================================
// HELPERS
// ============================================================================

fn parse_id(raw: &str) -> Result<RecordId> {
    raw.parse()
        .with_context(|| format!("'{}' is not a record id", raw))
}

fn parse_amount(raw: &str) -> Result<f64> {
    raw.parse()
        .with_context(|| format!("'{}' is not an amount", raw))
}

/// Print a recoverable failure and exit non-zero
fn fail(action: &str, err: impl Display) -> ! {
    eprintln!("❌ {} failed: {}", action, err);
    std::process::exit(1);
}

/// Load the configured data file, reporting skipped lines
fn load_registry(config: &LedgerConfig) -> Result<Registry> {
    if !config.data_file.exists() {
        eprintln!("❌ Data file not found: {}", config.data_file.display());
        eprintln!("   Run: entity-ledger demo");
        eprintln!("   to create a sample registry first.");
        std::process::exit(1);
    }

    let (registry, report) = Registry::load(&config.data_file, config.format)?;

    for failure in &report.failures {
        eprintln!("⚠️  Skipped: {}", failure);
    }

    Ok(registry)
}

/// Save the registry, then journal `events` and the save itself
///
/// Nothing is journaled when the save fails.
fn commit(
    config: &LedgerConfig,
    registry: &Registry,
    journal: &Journal,
    events: &[Event],
) -> Result<()> {
    let report = registry.save(&config.data_file, config.format)?;

    for event in events {
        journal.record(event)?;
    }

    journal.record(&Event::new(
        "save",
        None,
        json!({
            "path": config.data_file.display().to_string(),
            "format": config.format.as_str(),
            "records": report.written,
            "digest": report.digest,
        }),
        ACTOR,
    ))?;

    println!(
        "💾 Saved {} records ({} bytes) to {}",
        report.written,
        report.bytes,
        config.data_file.display()
    );

    Ok(())
}

fn open_journal(config: &LedgerConfig) -> Result<Journal> {
    Journal::open(&config.journal_file)
}

fn print_record(record: &dyn Record) {
    println!("[{}] {}", record.variant().name(), record.describe().join(" | "));
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_demo(config: &LedgerConfig) -> Result<()> {
    println!("🏗️  Writing sample registry");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut registry = Registry::new();
    registry.add(Box::new(PlainRecord::new(1, "Nguyen Van A", 30, 100.0)));
    registry.add(Box::new(MeteredRecord::new(2, "Tran Thi B", 20, 4)));
    registry.add(Box::new(SupervisoryRecord::new(3, "Le Van C", 40, 200.0, 5)));
    registry.add(Box::new(AccruingRecord::savings(4, "Pham Minh", 1000.0, 0.05)));
    registry.add(Box::new(AccruingRecord::term_deposit(5, "Hoang Lan", 2000.0, 0.06, 12)));
    registry.add(Box::new(BorrowableRecord::new(6, "Dune", "Frank Herbert")));
    registry.add(Box::new(BorrowableRecord::new(7, "Emma", "Jane Austen")));

    for record in registry.iter() {
        print_record(record);
    }

    let journal = open_journal(config)?;
    commit(config, &registry, &journal, &[])?;

    println!("✅ Demo registry ready ({} format)", config.format.as_str());
    Ok(())
}

fn run_list(config: &LedgerConfig, order: Option<&str>) -> Result<()> {
    let mut registry = load_registry(config)?;

    match order {
        None => {}
        Some("age") => registry.sort_by_age(),
        Some("value") => registry.sort_by_value(),
        Some("name") => registry.sort_by_name(),
        Some(other) => {
            eprintln!("❌ Unknown sort order '{}' (age, value, name)", other);
            std::process::exit(1);
        }
    }

    println!("📋 {} records", registry.len());
    for record in registry.iter() {
        print_record(record);
    }

    Ok(())
}

fn run_find(config: &LedgerConfig, key: &str) -> Result<()> {
    let registry = load_registry(config)?;

    let found = match key.parse::<RecordId>() {
        Ok(id) => registry.find_by_id(id),
        Err(_) => registry.find_by_name(key),
    };

    match found {
        Some(record) => print_record(record),
        None => println!("🔍 No record matches '{}'", key),
    }

    Ok(())
}

fn run_search(config: &LedgerConfig, query: &str) -> Result<()> {
    let registry = load_registry(config)?;
    let hits = registry.search(query);

    println!("🔍 {} matches for '{}'", hits.len(), query);
    for record in hits {
        print_record(record);
    }

    Ok(())
}

fn run_total(config: &LedgerConfig) -> Result<()> {
    let registry = load_registry(config)?;
    println!("💰 Total value of {} records: {:.2}", registry.len(), registry.total_value());
    Ok(())
}

fn run_transfer(config: &LedgerConfig, from: RecordId, to: RecordId, amount: f64) -> Result<()> {
    let mut registry = load_registry(config)?;
    let journal = open_journal(config)?;

    let receipt = match registry.transfer(from, to, amount) {
        Ok(receipt) => receipt,
        Err(err) => fail("Transfer", err),
    };

    println!(
        "🔁 Moved {:.2} from {} (now {:.2}) to {} (now {:.2})",
        receipt.amount, from, receipt.source_balance, to, receipt.destination_balance
    );

    let events = [
        Event::new(
            "transfer",
            Some(from),
            json!({ "to": to, "amount": amount, "balance": receipt.source_balance }),
            ACTOR,
        ),
        Event::new(
            "transfer",
            Some(to),
            json!({ "from": from, "amount": amount, "balance": receipt.destination_balance }),
            ACTOR,
        ),
    ];

    commit(config, &registry, &journal, &events)
}

fn run_accrue(config: &LedgerConfig, id: RecordId) -> Result<()> {
    let mut registry = load_registry(config)?;
    let journal = open_journal(config)?;

    let interest = match registry.apply_accrual(id) {
        Ok(interest) => interest,
        Err(err) => fail("Accrual", err),
    };

    println!("📈 Paid {:.2} interest into record {}", interest, id);

    let event = Event::new("accrual", Some(id), json!({ "interest": interest }), ACTOR);
    commit(config, &registry, &journal, &[event])
}

#[derive(Debug, Clone, Copy)]
enum LoanAction {
    Issue,
    Return,
}

fn run_loan(
    config: &LedgerConfig,
    action: LoanAction,
    id: RecordId,
    username: &str,
    password: &str,
) -> Result<()> {
    let users = config.user_store();
    if let Err(err) = users.login(username, password) {
        fail("Login", err);
    }

    let mut registry = load_registry(config)?;
    let journal = open_journal(config)?;

    let (kind, outcome) = match action {
        LoanAction::Issue => ("issue", registry.issue(id)),
        LoanAction::Return => ("return", registry.return_item(id)),
    };

    if let Err(err) = outcome {
        fail(kind, err);
    }

    println!("📚 Record {}: {} by {}", id, kind, username);

    let event = Event::new(kind, Some(id), json!({}), username);
    commit(config, &registry, &journal, &[event])
}

fn run_history(config: &LedgerConfig, id: RecordId) -> Result<()> {
    let journal = open_journal(config)?;
    let events = journal.events_for(id)?;

    println!("📜 {} events for record {}", events.len(), id);
    for event in events {
        println!(
            "  {}  {:<10} {:<8} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.kind,
            event.actor,
            event.data
        );
    }

    Ok(())
}

fn run_convert(config: &LedgerConfig, target: &str, output: Option<PathBuf>) -> Result<()> {
    let Some(format) = Format::parse(target) else {
        eprintln!("❌ Unknown format '{}' (legacy, tagged)", target);
        std::process::exit(1);
    };

    let registry = load_registry(config)?;
    let output = output.unwrap_or_else(|| {
        let mut path = config.data_file.clone().into_os_string();
        path.push(".");
        path.push(format.as_str());
        PathBuf::from(path)
    });

    let report = registry.save(&output, format)?;

    let journal = open_journal(config)?;
    journal.record(&Event::new(
        "convert",
        None,
        json!({
            "path": output.display().to_string(),
            "format": format.as_str(),
            "records": report.written,
            "digest": report.digest,
        }),
        ACTOR,
    ))?;

    println!(
        "🔄 Wrote {} records in {} format to {}",
        report.written,
        format.as_str(),
        output.display()
    );
    if format == Format::Legacy {
        println!("   Note: legacy files load every non-borrowable record back as Plain");
    }

    Ok(())
}

// ============================================================================
// UI MODE
// ============================================================================

#[cfg(feature = "tui")]
fn run_ui_mode(config: &LedgerConfig) -> Result<()> {
    println!("🖥️  Loading Entity Ledger UI...\n");

    if !config.data_file.exists() {
        eprintln!("❌ Data file not found: {}", config.data_file.display());
        eprintln!("   Run: entity-ledger demo");
        eprintln!("   to create a sample registry first.");
        std::process::exit(1);
    }

    let (registry, report) = Registry::load(&config.data_file, config.format)?;
    println!("✓ Loaded {} records\n", report.loaded);
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(registry, report.failures.len());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &LedgerConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a command, e.g.: entity-ledger list");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> LedgerConfig {
        LedgerConfig {
            data_file: dir.join("registry.txt"),
            journal_file: dir.join("journal.db"),
            ..LedgerConfig::default()
        }
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.add(Box::new(PlainRecord::new(1, "A", 30, 100.0)));
        registry.add(Box::new(PlainRecord::new(3, "C", 40, 200.0)));
        registry
    }

    #[test]
    fn test_commit_journals_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let journal = Journal::in_memory().unwrap();

        let event = Event::new("accrual", Some(1), json!({ "interest": 5.0 }), ACTOR);
        commit(&config, &sample_registry(), &journal, &[event]).unwrap();

        assert!(config.data_file.exists());
        assert_eq!(journal.events_for(1).unwrap().len(), 1);
        assert_eq!(journal.count().unwrap(), 2);
    }

    #[test]
    fn test_failed_save_journals_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        // A directory cannot be written as a file
        config.data_file = dir.path().to_path_buf();
        let journal = Journal::in_memory().unwrap();

        let mut registry = sample_registry();
        let receipt = registry.transfer(1, 3, 50.0).unwrap();
        let event = Event::new("transfer", Some(1), json!({ "amount": receipt.amount }), ACTOR);

        assert!(commit(&config, &registry, &journal, &[event]).is_err());
        assert_eq!(journal.count().unwrap(), 0);
    }
}
