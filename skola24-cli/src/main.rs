mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use skola24_core::client::TimetableClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skola24")]
#[command(about = "Skola24 timetable lookup tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tenant host, e.g. it-gymnasiet.skola24.se
    #[arg(short = 'H', long)]
    host: String,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log render keys and raw timetable payloads (debug level)
    #[arg(long)]
    trace_payloads: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List units (schools)
    Units,

    /// List the classes of a unit
    Groups {
        /// Unit GUID from `units`
        #[arg(short, long)]
        unit: String,
    },

    /// Fetch one week of lessons for a class
    Timetable {
        /// Unit GUID from `units`
        #[arg(short, long)]
        unit: String,

        /// Group GUID from `groups`
        #[arg(short, long)]
        group: String,

        /// ISO year, defaults to the current one (needs --week)
        #[arg(short, long, requires = "week")]
        year: Option<i32>,

        /// ISO week number, defaults to the current week of the current year
        #[arg(short, long)]
        week: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file path, stdout when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Calendar name (ics)
        #[arg(long)]
        calendar_name: Option<String>,

        /// Leave teachers out of the event description (ics)
        #[arg(long)]
        no_teacher: bool,

        /// Reminder before each lesson in minutes (ics)
        #[arg(long, default_value = "10")]
        reminder_minutes: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Ics,
}

/// Log filter used when `RUST_LOG` is unset.
/// `--trace-payloads` lifts the core crate to debug so its payload events show.
fn default_filter(verbose: bool, trace_payloads: bool) -> String {
    let cli_level = if verbose { "debug" } else { "info" };
    let core_level = if verbose || trace_payloads {
        "debug"
    } else {
        "info"
    };
    format!("skola24_cli={},skola24_core={}", cli_level, core_level)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose, cli.trace_payloads).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut builder = TimetableClient::builder(cli.host).trace_payloads(cli.trace_payloads);
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(secs);
    }
    let client = builder.build()?;

    match cli.command {
        Commands::Units => commands::units_command(&client).await,

        Commands::Groups { unit } => commands::groups_command(&client, &unit).await,

        Commands::Timetable {
            unit,
            group,
            year,
            week,
            format,
            output,
            calendar_name,
            no_teacher,
            reminder_minutes,
        } => {
            commands::timetable_command(
                &client,
                commands::TimetableParams {
                    unit_guid: unit,
                    group_guid: group,
                    year,
                    week,
                    format,
                    output,
                    calendar_name,
                    include_teacher: !no_teacher,
                    reminder_minutes,
                },
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(
            default_filter(false, false),
            "skola24_cli=info,skola24_core=info"
        );
        assert_eq!(
            default_filter(true, false),
            "skola24_cli=debug,skola24_core=debug"
        );
        assert_eq!(
            default_filter(false, true),
            "skola24_cli=info,skola24_core=debug"
        );
    }

    #[test]
    fn test_year_requires_week() {
        let err = Cli::try_parse_from([
            "skola24", "-H", "example.skola24.se", "timetable", "-u", "g1", "-g", "c1", "-y",
            "2024",
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "skola24", "-H", "example.skola24.se", "timetable", "-u", "g1", "-g", "c1", "-w",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Timetable { year, week, .. } => {
                assert_eq!(year, None);
                assert_eq!(week, Some(10));
            }
            _ => panic!("expected timetable command"),
        }
    }
}
