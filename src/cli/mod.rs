use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipkit")]
#[command(author, version, about = "E-reader clippings parsing and cataloguing toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a bounded preview of a clippings file
    Preview(PreviewArgs),

    /// Detect the language of a clippings file
    Detect(DetectArgs),

    /// Parse a clippings file into structured records
    Parse(ParseArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., general.language)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file path
    Path,

    /// Edit config file with default editor
    Edit,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Input clippings file (e.g., "My Clippings.txt")
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum number of lines to show
    #[arg(short, long)]
    pub lines: Option<usize>,

    /// Text encoding (utf-8, utf-8-lossy, latin1)
    #[arg(long)]
    pub encoding: Option<String>,
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Input clippings file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum number of preview lines to inspect
    #[arg(short, long)]
    pub lines: Option<usize>,

    /// Text encoding (utf-8, utf-8-lossy, latin1)
    #[arg(long)]
    pub encoding: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Input clippings file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Clippings file language (english, spanish); detected when omitted
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Text encoding (utf-8, utf-8-lossy, latin1)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Parse even when the language compatibility check fails
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// SQLite database to store parsed clippings in
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Write parsed clippings as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,
}
