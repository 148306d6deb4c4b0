//! tryit CLI entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tryit_host::settings::HostSettings;
use tryit_host::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "tryit")]
#[command(about = "Run notebook cells against an evaluation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: <config dir>/tryit/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the settings file)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed a session with cells and run them
    Run {
        /// Engine program (overrides the settings file)
        #[arg(long)]
        engine: Option<String>,

        /// Argument passed to the engine program (repeatable)
        #[arg(long = "engine-arg", allow_hyphen_values = true)]
        engine_args: Vec<String>,

        /// File whose contents seed one cell (repeatable)
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,

        /// After the seeded cells, run each stdin line in the focused cell
        #[arg(long, short)]
        interactive: bool,

        /// Print the final session state as JSON
        #[arg(long)]
        json: bool,

        /// Cell sources
        cells: Vec<String>,
    },

    /// Print the effective settings
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = HostSettings::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&settings.log_level),
    )
    .init();

    match cli.command {
        Commands::Run {
            engine,
            engine_args,
            files,
            interactive,
            json,
            cells,
        } => {
            if let Some(program) = engine {
                settings.engine = std::iter::once(program).chain(engine_args).collect();
            } else if !engine_args.is_empty() {
                settings.engine.extend(engine_args);
            }

            let options = RunOptions {
                cells,
                files,
                interactive,
            };
            let local = tokio::task::LocalSet::new();
            let snapshot = local.run_until(tryit_host::run(&settings, options)).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
