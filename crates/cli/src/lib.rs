pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wardrobe_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

use crate::commands::rank::RankOrder;

#[derive(Debug, Parser)]
#[command(
    name = "wardrobe",
    about = "Wardrobe selection and wear-tracking CLI",
    long_about = "Add clothing items, filter and rank them by wear, pick a random outfit \
                  piece, and keep blob storage consistent with the item records.",
    after_help = "Examples:\n  wardrobe add --image tee.png --type T-Shirt --occasion Chill\n  \
                  wardrobe list --type Shoes\n  wardrobe pick --occasion \"Going Out\"\n  \
                  wardrobe least-worn"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct FilterArgs {
    #[arg(long = "type", value_name = "TYPE", help = "Only items of this clothing type")]
    item_type: Option<String>,
    #[arg(long, value_name = "OCCASION", help = "Only items for this occasion")]
    occasion: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compress an image, upload it and record a new clothing item")]
    Add {
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
        #[arg(long = "type", value_name = "TYPE", default_value = "")]
        item_type: String,
        #[arg(long, value_name = "OCCASION", default_value = "")]
        occasion: String,
    },
    #[command(about = "List items in load order, optionally filtered")]
    List(FilterArgs),
    #[command(about = "Pick a random item from the filtered set and record one wear")]
    Pick(FilterArgs),
    #[command(about = "Rank the filtered set from least to most worn")]
    LeastWorn(FilterArgs),
    #[command(about = "Rank the filtered set from most to least worn")]
    MostPopular(FilterArgs),
    #[command(about = "Record one wear for an item")]
    Wear { id: String },
    #[command(about = "Delete an item's image and record after confirmation")]
    Delete {
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Remove stored images that no item record references")]
    Sweep,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, blob storage and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Installs the global subscriber. Logs go to stderr so stdout stays a single JSON
/// document per command; `RUST_LOG` overrides the configured level.
pub fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        eprintln!("logging already initialized: {error}");
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // A broken config is reported by the command itself; log with defaults meanwhile.
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init_logging(&logging);

    let result = match cli.command {
        Command::Add { image, item_type, occasion } => {
            commands::add::run(image.as_deref(), &item_type, &occasion)
        }
        Command::List(filter) => {
            commands::list::run(filter.item_type.as_deref(), filter.occasion.as_deref())
        }
        Command::Pick(filter) => {
            commands::pick::run(filter.item_type.as_deref(), filter.occasion.as_deref())
        }
        Command::LeastWorn(filter) => commands::rank::run(
            RankOrder::LeastWorn,
            filter.item_type.as_deref(),
            filter.occasion.as_deref(),
        ),
        Command::MostPopular(filter) => commands::rank::run(
            RankOrder::MostPopular,
            filter.item_type.as_deref(),
            filter.occasion.as_deref(),
        ),
        Command::Wear { id } => commands::wear::run(&id),
        Command::Delete { id, yes } => commands::delete::run(&id, yes),
        Command::Sweep => commands::sweep::run(),
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
