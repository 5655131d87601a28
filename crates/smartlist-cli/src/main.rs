use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, lists, process};
use smartlist_models::ListId;

mod commands;
mod host;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "smartlist")]
#[command(about = "Smartlist - keep Trakt lists in sync with filters and rosters")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stored lists with their processing state
    Lists,
    /// Trigger a list and wait for its pass to finish
    #[command(long_about = "Mark the list as scheduled, queue it like the recurring driver would and wait until a worker has processed it. Lists that are already scheduled, updating or paused are left alone.")]
    Scan {
        list_id: ListId,
    },
    /// Run one processing pass in the foreground
    Process {
        list_id: ListId,

        /// Ask for the next processing cycle once the pass ends
        #[arg(long, action = ArgAction::SetTrue)]
        queue_next: bool,

        /// Push the list's name and description upstream
        #[arg(long, action = ArgAction::SetTrue)]
        force_refresh: bool,
    },
    /// Re-enable a list paused after an authorization failure
    Resume {
        list_id: ListId,
    },
    /// Return a list stuck in scheduled or updating to idle
    Reset {
        list_id: ListId,
    },
    /// Print the last manual roster report of a list
    Report {
        list_id: ListId,
    },
    /// Run the worker pool and recurring processing cycles
    #[command(long_about = "Run smartlist as a long-lived process: a pool of workers drains the priority and default queues while processing cycles are started by the cron schedule. A cycle runs on startup unless --no-startup-run is given.")]
    Daemon {
        /// Cron schedule with a seconds field (e.g. '0 0 */6 * * *')
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the processing cycle on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,

        /// Start the next cycle a fixed delay after the previous one ends
        #[arg(long, action = ArgAction::SetTrue)]
        chain: bool,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a configuration template
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);

    // The daemon installs its own subscriber once the config is loaded
    if !matches!(cli.command, Commands::Daemon { .. }) {
        logging::init_logging(cli.verbose, cli.quiet)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    }

    match cli.command {
        Commands::Lists => lists::run_lists(&output).await,
        Commands::Scan { list_id } => process::run_scan(list_id, &output).await,
        Commands::Process {
            list_id,
            queue_next,
            force_refresh,
        } => process::run_process(list_id, queue_next, force_refresh, &output).await,
        Commands::Resume { list_id } => lists::run_resume(list_id, &output).await,
        Commands::Reset { list_id } => lists::run_reset(list_id, &output).await,
        Commands::Report { list_id } => lists::run_report(list_id, &output).await,
        Commands::Daemon {
            schedule,
            no_startup_run,
            chain,
        } => {
            let options = daemon::DaemonOptions {
                schedule,
                no_startup_run,
                chain,
                verbose: cli.verbose,
                quiet: cli.quiet,
            };
            daemon::run_daemon(options, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
