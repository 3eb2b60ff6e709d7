//! wheel-bridge CLI — fuses a pointing-button device and a touch surface
//! into a synthetic scroll wheel.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use wheel_bridge_daemon::{config, diagnostics, Daemon};
use wheel_bridge_input::locate;

#[derive(Parser)]
#[command(
    name = "wheel-bridge",
    about = "Bridge a button device and a touch surface into a scroll wheel",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridging daemon in the foreground.
    Run {
        /// Path to the configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Report device, permission, and environment state.
    Diagnose,

    /// List input devices and how the matching rules classify them.
    Devices,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run { config: path } => {
            let settings = config::load(path.as_deref())?;
            config::log_summary(&settings);

            let mut daemon = match Daemon::bootstrap(settings) {
                Ok(daemon) => daemon,
                Err(e) => {
                    // Startup failures carry the full environment report so
                    // the supervisor journal is actionable on its own.
                    let report = diagnostics::collect(&locate::DEFAULT_RULES);
                    for line in report.render().lines() {
                        tracing::error!("{line}");
                    }
                    return Err(e.into());
                }
            };
            daemon.run().await?;
            Ok(())
        }

        Commands::Diagnose => {
            let report = diagnostics::collect(&locate::DEFAULT_RULES);
            print!("{}", report.render());
            Ok(())
        }

        Commands::Devices => {
            for path in locate::event_nodes()? {
                match locate::probe(&path) {
                    Some(name) => {
                        let role = match locate::classify(&name, &locate::DEFAULT_RULES) {
                            Some(locate::DeviceRole::Mouse) => "  [pointing-button]",
                            Some(locate::DeviceRole::Touch) => "  [touch-surface]",
                            None => "",
                        };
                        println!("{}  {name}{role}", path.display());
                    }
                    None => println!("{}  (unreadable)", path.display()),
                }
            }
            Ok(())
        }
    }
}
