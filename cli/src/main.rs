mod entry;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use deliverylog_core::{parse_entry_date, Config, FileRosterRepository, FormKind, SaveIntent};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deliverylog")]
#[command(about = "Daily delivery sheets and monthly/yearly rate summaries", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/deliverylog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root folder of the sheets, overrides the config
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter, view or delete a day's rows
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },
    /// Aggregate daily sheets into a summary sheet
    Summary {
        #[command(subcommand)]
        command: SummaryCommand,
    },
    /// List the employees on the roster
    Roster,
}

#[derive(Subcommand)]
enum EntryCommand {
    /// Save rows (usage: save --date today --row "Aiko mo:60 af:40 mis:2")
    Save {
        #[arg(long, default_value = "today")]
        date: String,
        #[arg(long, value_enum, default_value_t = FormArg::Misdelivery)]
        form: FormArg,
        /// Needed when the day already has a sheet
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// One employee per row: NAME key:value ...
        #[arg(long = "row", required = true)]
        rows: Vec<String>,
    },
    /// Show the rows saved for a day
    Show {
        #[arg(long, default_value = "today")]
        date: String,
        #[arg(long, value_enum, default_value_t = FormArg::Misdelivery)]
        form: FormArg,
    },
    /// Delete one employee's row for a day
    Remove {
        #[arg(long)]
        date: String,
        #[arg(long)]
        employee: String,
        #[arg(long, value_enum, default_value_t = FormArg::Misdelivery)]
        form: FormArg,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SummaryCommand {
    /// Summarize one month
    Monthly {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long, value_enum, default_value_t = FormArg::Misdelivery)]
        form: FormArg,
        #[arg(long)]
        json: bool,
    },
    /// Summarize one year
    Yearly {
        #[arg(long)]
        year: i32,
        #[arg(long, value_enum, default_value_t = FormArg::Misdelivery)]
        form: FormArg,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormArg {
    Misdelivery,
    Fulfillment,
}

impl From<FormArg> for FormKind {
    fn from(arg: FormArg) -> Self {
        match arg {
            FormArg::Misdelivery => FormKind::Misdelivery,
            FormArg::Fulfillment => FormKind::Fulfillment,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Append,
    Modify,
}

impl From<ModeArg> for SaveIntent {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Append => SaveIntent::Append,
            ModeArg::Modify => SaveIntent::Modify,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_dir) = &cli.base_dir {
        config = config.with_base_dir(base_dir.clone());
    }
    debug!(base_dir = %config.base_dir.display(), "configuration loaded");
    Ok(config)
}

fn parse_date(input: &str) -> Result<chrono::NaiveDate> {
    parse_entry_date(input, Local::now().date_naive()).with_context(|| format!("Invalid date '{}'", input))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Entry { command } => match command {
            EntryCommand::Save {
                date,
                form,
                mode,
                yes,
                rows,
            } => {
                let date = parse_date(&date)?;
                entry::save(&config, form.into(), date, mode.map(Into::into), &rows, yes)?;
            }
            EntryCommand::Show { date, form } => {
                entry::show(&config, form.into(), parse_date(&date)?)?;
            }
            EntryCommand::Remove {
                date,
                employee,
                form,
                yes,
            } => {
                entry::remove(&config, form.into(), parse_date(&date)?, &employee, yes)?;
            }
        },
        Commands::Summary { command } => match command {
            SummaryCommand::Monthly {
                year,
                month,
                form,
                json,
            } => {
                report::monthly(&config, form.into(), year, month, json)?;
            }
            SummaryCommand::Yearly { year, form, json } => {
                report::yearly(&config, form.into(), year, json)?;
            }
        },
        Commands::Roster => {
            let roster = FileRosterRepository::new(config.roster_path())
                .load()
                .context("Failed to load the employee roster")?;
            if roster.is_empty() {
                println!("The roster is empty.");
            }
            for name in roster.names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
