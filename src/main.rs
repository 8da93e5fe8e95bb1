/// Command-line interface for the provider scheduling engine.
///
/// This module provides a CLI for listing providers, generating schedules
/// from their weekly templates, applying schedule updates and running a demo.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use hms_engine::config::DEFAULT_CONFIG_PATH;
use hms_engine::logger;
use hms_engine::{
    MessageCenter, Provider, ProviderDirectory, RandomStatus, ScheduleDate, ScheduleEngine,
    ScheduleError, ScheduleUpdate, SchedulerConfig,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "hms-engine")]
#[command(about = "Provider availability and time-slot scheduling")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[arg(long, short, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List configured providers
    Providers,
    /// Generate a provider's schedule for a date range
    Generate {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, help = "Print the schedule as JSON")]
        json: bool,
    },
    /// Check a JSON array of schedule dates against a provider (dry run)
    Update {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Run a self-contained demo
    Demo,
}

fn print_header() {
    println!("\n{}", "=".repeat(60));
    println!("       PROVIDER SCHEDULING ENGINE");
    println!("{}", "=".repeat(60));
}

fn print_schedule(dates: &[ScheduleDate]) {
    if dates.is_empty() {
        println!("\nNo available dates in range");
        return;
    }

    for schedule_date in dates {
        println!(
            "\n{} ({} slots):",
            schedule_date.date.format("%A, %Y-%m-%d"),
            schedule_date.time_slots.len()
        );
        for slot in &schedule_date.time_slots {
            println!(
                "  {} - {}  {}",
                slot.start_time,
                slot.end_time,
                slot.status.name()
            );
        }
    }
}

fn list_providers(engine: &ScheduleEngine) {
    let providers = engine.directory().providers();
    if providers.is_empty() {
        println!("\nNo providers configured");
        return;
    }

    println!("\n--- Providers ({}) ---", providers.len());
    for provider in providers {
        println!(
            "  {:10} {:25} {} ({} min slots, {} blocked dates)",
            provider.id,
            provider.name,
            provider.specialty,
            provider.availability.default_slot_duration,
            provider.availability.blocked_dates.len()
        );
    }
}

fn generate(
    engine: &mut ScheduleEngine,
    provider: &str,
    from: NaiveDate,
    to: NaiveDate,
    json: bool,
) -> Result<(), ScheduleError> {
    let dates = engine.generate_schedule(provider, from, to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dates)?);
    } else {
        println!("\n--- Schedule for {} ({} to {}) ---", provider, from, to);
        print_schedule(&dates);
    }
    Ok(())
}

fn update(engine: &mut ScheduleEngine, provider: &str, file: &Path) -> Result<(), ScheduleError> {
    let content = std::fs::read_to_string(file)?;
    let dates: Vec<ScheduleDate> = serde_json::from_str(&content)?;
    let count = dates.len();

    // The engine is not persisted, so this only validates the update.
    engine.update_schedule(provider, ScheduleUpdate::with_dates(dates))?;
    println!(
        "\nUpdate for {} with {} dates validated and accepted (dry run, nothing stored)",
        provider, count
    );
    Ok(())
}

fn next_monday() -> NaiveDate {
    let mut date = Local::now().date_naive() + Duration::days(1);
    while date.weekday() != Weekday::Mon {
        date = date + Duration::days(1);
    }
    date
}

async fn run_demo() -> Result<(), ScheduleError> {
    println!("\n--- Running Demo ---");

    let provider = Provider::new(
        "demo-001".to_string(),
        "Dr. Demo".to_string(),
        "Family Medicine".to_string(),
    )?;
    let directory = ProviderDirectory::from_providers(vec![provider])?;
    let mut engine = ScheduleEngine::new(directory, Box::new(RandomStatus::seeded(7)));

    let monday = next_monday();
    let dates = engine.publish_schedule("demo-001", monday, monday)?;
    let total: usize = dates.iter().map(|d| d.time_slots.len()).sum();
    println!(
        "Published {} slots for {} (09:00-17:00, lunch 12:00-13:00, 30 min)",
        total, monday
    );
    print_schedule(&dates);

    let open = engine.available_slots("demo-001", monday)?;
    if let Some(slot) = open.first() {
        let booking = engine.book_slot("demo-001", monday, &slot.id, "patient-001")?;
        println!(
            "\nBooked {} - {} for patient-001 (appointment {}...)",
            booking.slot.start_time,
            booking.slot.end_time,
            &booking.appointment_id[..8]
        );
    }

    let overlapping = dates
        .first()
        .and_then(|d| d.time_slots.first())
        .map(|first| {
            let mut clash = first.clone();
            clash.id = format!("{}-overlap", first.id);
            vec![ScheduleDate::new(monday, vec![first.clone(), clash])]
        });
    if let Some(bad) = overlapping {
        match engine.update_schedule("demo-001", ScheduleUpdate::with_dates(bad)) {
            Err(e) => println!("\nOverlapping update rejected: {}", e),
            Ok(()) => println!("\nOverlapping update was unexpectedly accepted"),
        }
    }

    let messages = MessageCenter::new(std::time::Duration::from_millis(200));
    let receipt = messages
        .send("patient-001", "demo-001", "Appointment", "See you on Monday")
        .await;
    println!("\nMessage sent, waiting for delivery...");
    let status = receipt.wait().await?;
    println!("Message status: {:?}", status);

    println!("\nAudit trail:");
    for event in engine.audit_trail().events() {
        println!("  [{}] {}", event.action.name(), event.details);
    }
    Ok(())
}

fn run_command(config_path: &Path, command: Command) -> Result<(), ScheduleError> {
    let config = SchedulerConfig::from_file(config_path)?;
    let mut engine = ScheduleEngine::from_config(&config)?;

    match command {
        Command::Providers => {
            list_providers(&engine);
            Ok(())
        }
        Command::Generate {
            provider,
            from,
            to,
            json,
        } => generate(&mut engine, &provider, from, to, json),
        Command::Update { provider, file } => update(&mut engine, &provider, &file),
        // Runs without configuration, see main.
        Command::Demo => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    print_header();

    let result = match cli.command {
        Command::Demo => run_demo().await,
        command => run_command(&cli.config, command),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_conflict() { 2 } else { 1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MONDAY_SLOTS: &str = r#"[
        {"date": "2024-01-15", "timeSlots": [
            {"id": "a", "startTime": "09:00", "endTime": "09:30", "status": "available"}
        ]},
        {"date": "2024-01-15", "timeSlots": [
            {"id": "b", "startTime": "SECOND_START", "endTime": "10:00", "status": "available"}
        ]}
    ]"#;

    fn engine() -> ScheduleEngine {
        let provider =
            Provider::new("p1".to_string(), "Dr. Demo".to_string(), "General".to_string()).unwrap();
        let directory = ProviderDirectory::from_providers(vec![provider]).unwrap();
        ScheduleEngine::new(directory, Box::new(RandomStatus::seeded(1)))
    }

    fn dates_file(second_start: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", MONDAY_SLOTS.replace("SECOND_START", second_start)).unwrap();
        file
    }

    #[test]
    fn test_update_command_validates_without_touching_the_file() {
        let file = dates_file("09:30");
        let before = std::fs::read_to_string(file.path()).unwrap();

        let mut engine = engine();
        update(&mut engine, "p1", file.path()).unwrap();

        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), before);
        assert_eq!(engine.directory().get("p1").unwrap().schedule.dates.len(), 1);
    }

    #[test]
    fn test_update_command_reports_conflicts() {
        let file = dates_file("09:15");
        let err = update(&mut engine(), "p1", file.path()).unwrap_err();
        assert!(err.is_conflict());
    }
}
