//! Command line interface
//!
//! Argument parsing plus the one-shot commands that run without the TUI.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use protocol::{Calibration, CalibrationTarget, Command, Target};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use crate::config::{ClientConfig, Language};
use crate::labels::Labels;
use crate::network::{CameraClient, LiveChannel, LiveState};

#[derive(Parser, Debug)]
#[command(name = "topdon-remote")]
#[command(author, version, about = "Remote control for a networked thermal camera")]
#[command(long_about = "
Watch and control a thermal camera that runs the topdon web service:
live video, recording, photos, image orientation, HUD, target selection,
temperature calibration and saved file management.

EXAMPLES:
    # Interactive TUI with default config
    topdon-remote

    # Talk to a specific camera
    topdon-remote --url http://192.168.1.20:5000

    # One-shot commands
    topdon-remote status
    topdon-remote send take-photo
    topdon-remote download TC001_0001.mp4 --out ~/captures

CONFIGURATION:
    The client looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/topdon-remote/client.toml
    3. /etc/topdon-remote/client.toml
    4. Built-in defaults
")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    pub save_config: bool,

    /// Camera base URL (overrides the config file)
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// UI language
    #[arg(long, value_enum)]
    pub lang: Option<Language>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Interactive terminal UI (default)
    Tui,
    /// Print whether the camera is recording
    Status,
    /// List saved files
    List,
    /// Download a saved file
    Download {
        /// Server-side filename
        filename: String,
        /// Target directory (defaults to the configured download directory)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Delete a saved file
    Delete {
        /// Server-side filename
        filename: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Send a camera command (toggle-recording, take-photo, flip-image, ...)
    Send {
        command: Command,
    },
    /// Set the target at normalized image coordinates
    Target {
        x: f64,
        y: f64,
    },
    /// Pin a temperature reading (min, max, average) to a known value
    Calibrate {
        destination: CalibrationTarget,
        #[arg(allow_negative_numbers = true)]
        temperature: f64,
    },
    /// Receive live frames without the TUI and log their sizes
    Watch {
        /// Stop after this many frames
        #[arg(short, long)]
        frames: Option<u64>,
    },
}

impl Args {
    /// Apply command line overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut ClientConfig) -> Result<()> {
        if let Some(url) = &self.url {
            config.device.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.client.log_level = level.clone();
        }
        if let Some(lang) = self.lang {
            config.client.language = lang;
        }
        config.validate().context("Invalid configuration")
    }
}

/// Run a one-shot command
pub async fn run_command(command: Commands, camera: &CameraClient, config: &ClientConfig) -> Result<()> {
    let labels = Labels::for_language(config.client.language);

    match command {
        Commands::Tui => bail!("The TUI is not a one-shot command"),
        Commands::Status => {
            let status = camera
                .recording_status()
                .await
                .context("Failed to fetch recording status")?;
            println!("{}", labels.record_label(status.recording));
            println!("recording: {}", status.recording);
        }
        Commands::List => {
            let files = camera.file_list().await.context("Failed to load file list")?;
            if files.is_empty() {
                println!("{}", labels.no_files);
            }
            for file in files {
                println!("{}\t{}", file.display_name(), file.filename);
            }
        }
        Commands::Download { filename, out } => {
            let dir = out.unwrap_or_else(|| config.download_dir());
            let path = camera
                .save_download(&filename, &dir)
                .await
                .with_context(|| format!("Download of {} failed", filename))?;
            println!("{}", path.display());
        }
        Commands::Delete { filename, yes } => {
            if !yes && !confirm(&labels.delete_prompt(&filename))? {
                info!("Delete of {} cancelled", filename);
                return Ok(());
            }
            camera
                .delete_file(&filename)
                .await
                .with_context(|| format!("Failed to delete {}", filename))?;
            println!("Deleted {}", filename);
        }
        Commands::Send { command } => {
            camera.dispatch(command).await;
            println!("Sent {}", command);
        }
        Commands::Target { x, y } => {
            let target = Target::new(x, y)?;
            camera
                .send_coordinates(target)
                .await
                .context("Failed to send coordinates")?;
        }
        Commands::Calibrate {
            destination,
            temperature,
        } => {
            let response = camera
                .calibrate(Calibration {
                    destination,
                    temperature,
                })
                .await
                .context("Calibration failed")?;
            println!("{}", response.message);
        }
        Commands::Watch { frames } => watch(camera, config, frames).await?,
    }
    Ok(())
}

/// Ask a yes/no question on the terminal
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "j" | "ja")
}

/// Headless live channel: log frame sizes until Ctrl+C or `limit` frames
async fn watch(camera: &CameraClient, config: &ClientConfig, limit: Option<u64>) -> Result<()> {
    let mut settings = config.live.clone();
    settings.enabled = true;
    let mut live = LiveChannel::spawn(camera.base_url(), settings)?;
    let mut received = 0u64;

    info!("Watching live frames. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            changed = live.frames.changed() => {
                if changed.is_err() {
                    warn!("Live channel stopped");
                    break;
                }
                let frame = live.frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    received += 1;
                    println!("frame {}: {}x{}", received, frame.width, frame.height);
                    if limit.is_some_and(|limit| received >= limit) {
                        break;
                    }
                }
            }
            changed = live.state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *live.state.borrow_and_update();
                info!("Live channel: {:?}", state);
                if state == LiveState::Disconnected && !config.live.reconnect {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    live.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tui() {
        let args = Args::try_parse_from(["topdon-remote"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.save_config);
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["topdon-remote", "send", "take-photo"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Send {
                command: Command::TakePhoto
            })
        );

        let args = Args::try_parse_from(["topdon-remote", "target", "0.5", "0.25"]).unwrap();
        assert_eq!(args.command, Some(Commands::Target { x: 0.5, y: 0.25 }));

        let args =
            Args::try_parse_from(["topdon-remote", "calibrate", "min", "-5.5"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Calibrate {
                destination: CalibrationTarget::Min,
                temperature: -5.5
            })
        );

        let args = Args::try_parse_from(["topdon-remote", "delete", "a b.png", "--yes"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Delete {
                filename: "a b.png".to_string(),
                yes: true
            })
        );

        assert!(Args::try_parse_from(["topdon-remote", "send", "explode"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "topdon-remote",
            "--url",
            "http://10.0.0.2:5000",
            "--lang",
            "de",
            "status",
        ])
        .unwrap();
        let mut config = ClientConfig::default();
        args.apply_overrides(&mut config).unwrap();

        assert_eq!(config.device.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.client.language, Language::De);

        let args = Args::try_parse_from(["topdon-remote", "--url", "camera"]).unwrap();
        assert!(args.apply_overrides(&mut ClientConfig::default()).is_err());
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Ja "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }
}
