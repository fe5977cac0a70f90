use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    init_config, merge_packs, show_index, verify_archives, DigestArg, InitConfigArgs,
    MergeOverrides,
};
use miette::Result;

mod commands;
mod errors;
mod logging;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (defaults to ./artpack.toml when present)
    #[arg(short, long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Enable debug output on the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the configured packs into one archive per catalog entry
    Merge {
        /// Pack location, repeatable; replaces the configured list
        #[arg(short, long = "pack")]
        packs: Vec<Utf8PathBuf>,

        /// Pack label, repeatable; one per pack in the same order
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// The directory to write merged archives to
        #[arg(short, long)]
        output_dir: Option<Utf8PathBuf>,

        /// Parent directory for per-entry scratch space
        #[arg(long)]
        scratch_dir: Option<Utf8PathBuf>,

        /// Stop after this many catalog entries (0 = unlimited)
        #[arg(short = 'n', long)]
        max_entries: Option<usize>,

        /// Replace output archives that already exist
        #[arg(long)]
        overwrite: bool,

        /// Store every asset copy instead of deduplicating identical bytes
        #[arg(long)]
        no_dedup: bool,

        /// Content digest used for deduplication
        #[arg(long, value_enum)]
        digest: Option<DigestArg>,

        /// Leave scratch directories in place after each entry
        #[arg(long)]
        keep_scratch: bool,

        /// Append informational events to this file
        #[arg(long)]
        run_log: Option<Utf8PathBuf>,

        /// Append error events to this file
        #[arg(long)]
        error_log: Option<Utf8PathBuf>,
    },
    /// List the catalog entries found across the configured packs
    Index {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that every asset reference in merged archives resolves
    Verify {
        /// Merged archives to check
        #[arg(required = true)]
        archives: Vec<Utf8PathBuf>,
    },
    /// Write a commented configuration template
    Init {
        /// Where to write the template
        #[arg(short, long, default_value = utils::config::DEFAULT_CONFIG_FILE)]
        output: Utf8PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
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

fn main() -> Result<()> {
    let args = parse_args();

    if let Commands::Init { output, force } = args.command {
        return init_config(InitConfigArgs { output, force });
    }

    let mut config = utils::config::load_config(args.config.as_deref())?;

    match args.command {
        Commands::Merge {
            packs,
            labels,
            output_dir,
            scratch_dir,
            max_entries,
            overwrite,
            no_dedup,
            digest,
            keep_scratch,
            run_log,
            error_log,
        } => {
            MergeOverrides {
                packs,
                labels,
                output_dir,
                scratch_dir,
                max_entries,
                overwrite,
                no_dedup,
                digest,
                keep_scratch,
                run_log,
                error_log,
            }
            .apply(&mut config);

            let _guards = logging::init_logging(
                args.verbose,
                config.run_log.as_deref(),
                config.error_log.as_deref(),
            )?;
            merge_packs(&config)
        }
        Commands::Index { json } => {
            let _guards = logging::init_logging(args.verbose, None, None)?;
            show_index(&config, json)
        }
        Commands::Verify { archives } => {
            let _guards =
                logging::init_logging(args.verbose, None, config.error_log.as_deref())?;
            verify_archives(&config, &archives)
        }
        Commands::Init { .. } => Ok(()),
    }
}
