//! `slots` CLI: inspect class-slot availability from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # What runs on a date and what is still open (snapshot from a file)
//! slots day 06/06/2025 --booked booked.json
//!
//! # The next bookable dates, starting two days out
//! slots window --booked booked.json --count 7
//!
//! # The placeholder window, ignoring bookings
//! slots window --placeholder --from 2025-06-05
//!
//! # Slot catalog
//! slots catalog
//!
//! # Live snapshot and availability check against the booking backend
//! slots fetch
//! slots check 06/09/2025 "9am-12pm EST/8am-11pm CST"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use booking_client::{load_config, BookingService, ClientConfig, HttpBookingService};
use clap::{Parser, Subcommand};
use tracing::warn;
use slot_engine::calendar::{candidate_dates, is_weekend, today_in};
use slot_engine::{
    format_key, parse_date, AvailabilityEngine, BookedMap, DateEligibility, DisplayClass, Selection,
    TimeSlot,
};

#[derive(Parser)]
#[command(name = "slots", version, about = "Weekday class-slot availability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show offered, booked and selectable slots for one date
    Day {
        /// Date as MM/DD/YYYY or YYYY-MM-DD
        date: String,
        /// Booked-dates JSON file (fetched from the backend if omitted; an
        /// unreachable backend counts as nothing booked)
        #[arg(short, long)]
        booked: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the rolling window of bookable dates
    Window {
        /// Treat this date as today (defaults to today in the configured timezone)
        #[arg(long)]
        from: Option<String>,
        /// Number of dates to list (defaults to the configured window length)
        #[arg(short, long)]
        count: Option<usize>,
        /// Days between today and the first date (defaults to the configured lead)
        #[arg(long)]
        lead: Option<u32>,
        /// Booked-dates JSON file (fetched from the backend if omitted; an
        /// unreachable backend counts as nothing booked)
        #[arg(short, long)]
        booked: Option<PathBuf>,
        /// Ignore bookings and list the plain weekday window
        #[arg(long, conflicts_with = "booked")]
        placeholder: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the slot catalog
    Catalog,
    /// Fetch the current booked-dates snapshot from the backend
    Fetch,
    /// Ask the backend whether a date and slot can still be booked
    Check {
        /// Date as MM/DD/YYYY or YYYY-MM-DD
        date: String,
        /// Slot identifier, exactly as listed by `slots catalog`
        slot: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let engine = AvailabilityEngine::default();

    match cli.command {
        Commands::Day { date, booked, json } => {
            let date = parse_date(&date).context("Invalid date")?;
            let booked = booked_map(booked.as_deref(), &config).await?;
            let eligibility = engine.eligibility(date, &booked);

            if json {
                println!("{}", serde_json::to_string_pretty(&eligibility)?);
            } else {
                print_day(&eligibility);
            }
        }
        Commands::Window {
            from,
            count,
            lead,
            booked,
            placeholder,
            json,
        } => {
            let today = match from {
                Some(raw) => parse_date(&raw).context("Invalid --from date")?,
                None => today_in(config.timezone()?),
            };
            let count = count.unwrap_or(config.window_len);
            let lead = lead.unwrap_or(config.lead_days);

            let (dates, booked) = if placeholder {
                (candidate_dates(today, lead, count), BookedMap::new())
            } else {
                let booked = booked_map(booked.as_deref(), &config).await?;
                (engine.valid_dates(&booked, today, lead, count), booked)
            };

            let rows: Vec<DateEligibility> = dates
                .into_iter()
                .map(|date| engine.eligibility(date, &booked))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!(
                        "{}  {}  {} of {} open",
                        format_key(row.date),
                        row.date.format("%a"),
                        row.selectable.len(),
                        row.offered.len()
                    );
                }
            }
        }
        Commands::Catalog => {
            let catalog = engine.catalog();
            for slot in catalog.standard() {
                println!("{}  (Mon-Fri)", slot);
            }
            println!("{}  (Fri only)", catalog.restricted());
        }
        Commands::Fetch => {
            let service = service(&config)?;
            let booked = service
                .booked_dates()
                .await
                .context("Failed to fetch booked dates")?;
            println!("{}", serde_json::to_string_pretty(&booked)?);
        }
        Commands::Check { date, slot } => {
            let date = parse_date(&date).context("Invalid date")?;
            if !engine.catalog().contains(&slot) {
                anyhow::bail!(
                    "Unknown slot: '{}'. Run `slots catalog` for the list of slots",
                    slot
                );
            }

            let service = service(&config)?;
            let selection = Selection::new(date, slot);
            let available = service
                .check_availability(&selection)
                .await
                .context("Failed to check availability")?;
            println!(
                "{} {}: {}",
                format_key(selection.date),
                selection.slot,
                if available { "available" } else { "booked" }
            );
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn service(config: &ClientConfig) -> Result<HttpBookingService> {
    HttpBookingService::from_config(config).context("Failed to build HTTP client")
}

/// Read the snapshot from `path`, or fetch it when no file is given.
///
/// A failed fetch is logged and treated as an empty snapshot, the same way a
/// form session degrades, so `day` and `window` still answer offline.
async fn booked_map(path: Option<&Path>, config: &ClientConfig) -> Result<BookedMap> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            BookedMap::from_json_str(&raw)
                .with_context(|| format!("Failed to parse booked dates: {}", path.display()))
        }
        None => match service(config)?.booked_dates().await {
            Ok(booked) => Ok(booked),
            Err(err) => {
                warn!(error = %err, "booked dates fetch failed, assuming nothing is booked");
                Ok(BookedMap::new())
            }
        },
    }
}

fn print_day(eligibility: &DateEligibility) {
    let join = |slots: &[TimeSlot]| {
        if slots.is_empty() {
            "-".to_string()
        } else {
            slots.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        }
    };

    let status = if is_weekend(eligibility.date) {
        "weekend"
    } else {
        match eligibility.display {
            DisplayClass::Full => "fully booked",
            DisplayClass::Partial => "partially booked",
            DisplayClass::None => "open",
        }
    };

    println!(
        "{} ({})",
        format_key(eligibility.date),
        eligibility.date.format("%A")
    );
    println!("offered:    {}", join(&eligibility.offered));
    println!("booked:     {}", join(&eligibility.booked));
    println!("selectable: {}", join(&eligibility.selectable));
    println!("status:     {}", status);
}
