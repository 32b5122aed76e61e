//! Command dispatch logic for upkeep

use super::{DownloadsArgs, FreshnessArgs, InitArgs, init_config, process_downloads, process_freshness};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "upkeep", author, version, long_about = None)]
#[command(about = "Repository upkeep jobs for CI")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: UpkeepSubcommand,
}

#[derive(Subcommand, Debug)]
enum UpkeepSubcommand {
    /// Find stale data files and open tracking issues for them
    Freshness(Box<FreshnessArgs>),
    /// Fetch package download statistics and write the summary report
    Downloads(Box<DownloadsArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        UpkeepSubcommand::Freshness(freshness_args) => process_freshness(host, freshness_args).await,
        UpkeepSubcommand::Downloads(downloads_args) => process_downloads(host, downloads_args).await,
        UpkeepSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
