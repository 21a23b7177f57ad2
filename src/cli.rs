use clap::{Parser, Subcommand};
use std::path::PathBuf;
use veogen::Locale;

#[derive(Parser, Debug)]
#[command(version, about = "Generate videos with Gemini Veo", long_about = None)]
pub struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Language of user-facing messages (id, en)
    #[arg(long, global = true)]
    pub locale: Option<Locale>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the saved API key
    #[command(subcommand)]
    Key(KeyCommands),

    /// List the available models and their options
    Models,

    /// Generate a single video
    Generate {
        #[arg(short, long)]
        prompt: String,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long)]
        aspect_ratio: Option<String>,
        #[arg(short = 'n', long)]
        count: Option<u32>,
        #[arg(short, long)]
        duration: Option<u32>,
        #[arg(long)]
        mute_audio: bool,
        /// PNG or JPEG to condition the video on
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Where to write the MP4 (defaults to a timestamped file in the output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate one video per line of a prompt file, one after another
    Batch {
        #[arg(short = 'f', long)]
        prompts_file: PathBuf,
        /// Images paired with prompts by position, up to 10
        #[arg(short, long)]
        image: Vec<PathBuf>,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long)]
        aspect_ratio: Option<String>,
        #[arg(short, long)]
        duration: Option<u32>,
        #[arg(long)]
        mute_audio: bool,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Save the Gemini API key
    Save { key: String },
    /// Remove the saved API key
    Clear,
    /// Show whether a key is available
    Status,
}
