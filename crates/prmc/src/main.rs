use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    collect_maps, compress_processed, list_processed, process_maps, CollectArgs, CompressArgs,
    ListArgs, ProcessArgs,
};
use miette::Result;
use utils::config::ConfigSource;

mod commands;
mod errors;
mod utils;

const DEFAULT_LOG_FILTER: &str = "prmc=info,prmc_collect=info,prmc_terrain=info,prmc_archive=warn";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the prmc.toml configuration file
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy new and changed map archives out of a PR:BF2 installation
    Collect {
        /// The PR:BF2 installation root
        #[arg(short, long)]
        path: Option<Utf8PathBuf>,

        /// The directory to collect archives into
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,

        /// Where to write the collection report
        #[arg(short, long)]
        report: Option<Utf8PathBuf>,
    },
    /// Extract heightmaps from collected archives into web artifacts
    Process {
        /// The directory holding collected archives
        #[arg(short, long)]
        input: Option<Utf8PathBuf>,

        /// The directory to write processed maps to
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,

        /// Process only this map
        #[arg(short, long)]
        map: Option<String>,
    },
    /// Gzip any uncompressed heightmap.json left in the processed directory
    Compress {
        /// The processed maps directory
        #[arg(short, long)]
        dir: Option<Utf8PathBuf>,
    },
    /// List processed maps and rewrite maps.json
    List {
        /// The processed maps directory
        #[arg(short, long)]
        dir: Option<Utf8PathBuf>,
    },
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Persist the PR:BF2 installation path
    SetInstallation {
        /// The installation root (the directory containing levels/)
        path: Utf8PathBuf,
    },
    /// Write the default configuration
    Reset,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { DEFAULT_LOG_FILTER };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    let source = ConfigSource::resolve(args.config);

    match args.command {
        Commands::Collect {
            path,
            output,
            report,
        } => collect_maps(
            &source.load(),
            CollectArgs {
                path,
                output,
                report,
            },
        ),
        Commands::Process { input, output, map } => {
            process_maps(&source.load(), ProcessArgs { input, output, map })
        }
        Commands::Compress { dir } => compress_processed(&source.load(), CompressArgs { dir }),
        Commands::List { dir } => list_processed(&source.load(), ListArgs { dir }),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::show_config(&source),
            ConfigAction::SetInstallation { path } => commands::set_installation(&source, path),
            ConfigAction::Reset => commands::reset_config(&source),
        },
    }
}
