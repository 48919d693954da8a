mod compare;
mod config_cmd;
mod poses;
mod replay;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use posture_coach::models::JointName;
use std::path::PathBuf;

pub use compare::CompareCommand;
pub use replay::ReplayCommand;
pub use validate::ValidateCommand;

#[derive(Parser)]
#[command(name = "posture-coach")]
#[command(about = "Compare body postures against reference poses and run pose training", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "POSTURE_COACH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check reference pose files for errors
    Validate(ValidateCommand),

    /// Compare one recorded frame against a reference pose
    Compare(CompareCommand),

    /// Manage a pose directory
    #[command(subcommand)]
    Poses(PosesSubcommands),

    /// Run a recorded frame stream through a training session
    Replay(ReplayCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum PosesSubcommands {
    /// List stored poses
    List {
        /// Pose directory
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Validate a reference pose file and copy it into the directory
    Add {
        /// Pose directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Reference pose JSON file
        file: PathBuf,

        /// Illustration to store next to the pose
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Create a reference pose from a recorded detector frame
    Capture {
        /// Pose directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Recorded detector frame (JSON)
        #[arg(short, long)]
        frame: PathBuf,

        /// Id of the new pose
        #[arg(long)]
        id: String,

        /// Joints to weight more heavily (e.g. leftWrist,rightWrist)
        #[arg(long, value_delimiter = ',')]
        important: Vec<JointName>,

        /// Joints to leave out of comparison
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<JointName>,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file location
    Path,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref();

        match self.command {
            Commands::Validate(cmd) => cmd.execute().await,
            Commands::Compare(cmd) => cmd.execute(config_path).await,
            Commands::Poses(subcmd) => match subcmd {
                PosesSubcommands::List { dir } => poses::list_poses(&dir).await,
                PosesSubcommands::Add { dir, file, image } => {
                    poses::add_pose(&dir, &file, image.as_deref()).await
                }
                PosesSubcommands::Capture {
                    dir,
                    frame,
                    id,
                    important,
                    ignore,
                } => {
                    let flags = poses::CaptureFlags {
                        important: &important,
                        ignored: &ignore,
                    };
                    poses::capture_pose(config_path, &dir, &frame, &id, flags).await
                }
            },
            Commands::Replay(cmd) => cmd.execute(config_path).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path).await,
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force).await,
                ConfigSubcommands::Path => config_cmd::print_path(config_path).await,
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
