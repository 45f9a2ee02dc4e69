//! TuneUp CLI
//!
//! Records a simulated request with the step profiler and inspects
//! exported profiles.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use tuneup_core::commands::{
    display_schema, display_version, execute_demo, print_profile_summary, validate_args,
    validate_profile_file, DemoArgs,
};
use tuneup_core::output::SummaryConfig;
use tuneup_core::utils::config::{AggregationConfig, UnclassifiedPolicy};

/// TuneUp - model/view/controller step profiling
#[derive(Parser, Debug)]
#[command(name = "tuneup")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Attribution of steps without a layer: inherit, inherit:<layer> or <layer>
    #[arg(long, global = true, default_value = "inherit", env = "TUNEUP_UNCLASSIFIED")]
    unclassified: UnclassifiedPolicy,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a simulated request and write its profile
    Demo {
        /// Output path for JSON profile
        #[arg(short, long, default_value = "tuneup-profile.json")]
        output: PathBuf,

        /// Output path for collapsed stacks (optional)
        #[arg(short, long)]
        collapsed: Option<PathBuf>,

        /// Number of top hot paths to include
        #[arg(long, default_value = "10")]
        top_paths: usize,

        /// Multiplier for simulated step durations
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Bar width of the text summary in characters
        #[arg(long, default_value = "50")]
        width: usize,
    },

    /// Print the step tree of a profile JSON file
    Summary {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Bar width in characters
        #[arg(long, default_value = "50")]
        width: usize,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let aggregation = AggregationConfig::new(cli.unclassified);

    match cli.command {
        Commands::Demo {
            output,
            collapsed,
            top_paths,
            scale,
            summary,
            width,
        } => {
            let args = DemoArgs {
                output_json: output,
                output_collapsed: collapsed,
                top_paths,
                scale,
                print_summary: summary,
                width,
                unclassified: aggregation.unclassified,
            };

            validate_args(&args)?;
            execute_demo(args)?;
        }

        Commands::Summary {
            file,
            width,
            no_color,
        } => {
            let config = SummaryConfig {
                width,
                color: !no_color,
                ..SummaryConfig::default()
            };
            print_profile_summary(&file, aggregation, &config)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(&file, aggregation)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
