//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Subway line topology manager: stations, lines and their section chains
#[derive(Parser, Debug)]
#[command(name = "subway")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Store file (overrides config and SUBWAY_DATA_FILE)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stations
    Station {
        #[command(subcommand)]
        command: StationCommands,
    },

    /// Manage lines
    Line {
        #[command(subcommand)]
        command: LineCommands,
    },

    /// Add or remove sections of a line
    Section {
        #[command(subcommand)]
        command: SectionCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum StationCommands {
    /// Register a station
    Add {
        /// Station name
        name: String,
    },

    /// List stations
    List,

    /// Show one station
    Show {
        /// Station id
        id: u64,
    },

    /// Delete a station no line uses
    Remove {
        /// Station id
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum LineCommands {
    /// Create a line with its first section
    Create {
        /// Line name
        name: String,
        /// Line color (default from config)
        #[arg(short, long)]
        color: Option<String>,
        /// Up-terminal station id
        #[arg(long)]
        up: u64,
        /// Down-terminal station id
        #[arg(long)]
        down: u64,
        /// Distance between the two stations
        #[arg(long, allow_negative_numbers = true)]
        distance: i64,
    },

    /// List lines
    List,

    /// Show a line's stations in order
    Show {
        /// Line id
        id: u64,
    },

    /// Rename or recolor a line
    Update {
        /// Line id
        id: u64,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New color
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a line
    Delete {
        /// Line id
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum SectionCommands {
    /// Add a section: extend a terminal or split an existing section
    Add {
        /// Line id
        line: u64,
        /// Up station id
        #[arg(long)]
        up: u64,
        /// Down station id
        #[arg(long)]
        down: u64,
        /// Section distance
        #[arg(long, allow_negative_numbers = true)]
        distance: i64,
    },

    /// Remove a station from a line
    Remove {
        /// Line id
        line: u64,
        /// Station id to remove
        #[arg(long)]
        station: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show config file locations
    Path,

    /// Print a config template
    Template,
}
