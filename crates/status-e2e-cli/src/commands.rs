//! CLI command definitions using clap

use crate::config::ColorChoice;
use clap::{Parser, Subcommand, ValueEnum};
use status_e2e::{LinkKind, LinkScheme};
use std::path::PathBuf;

/// status-e2e: end-to-end suites for the Status mobile app
#[derive(Parser, Debug)]
#[command(name = "status-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a suite against Appium devices
    Run(RunArgs),

    /// List suites and their cases
    List(ListArgs),

    /// Build or convert Status links
    Link(LinkArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite to run
    #[arg(short, long, default_value = "deep_links_one_device")]
    pub suite: String,

    /// Only run cases whose name or test-management id contains this
    #[arg(short, long)]
    pub filter: Option<String>,

    /// YAML configuration file
    #[arg(short, long, env = "STATUS_E2E_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the JSON report here
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the link command
#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// Link subcommand
    #[command(subcommand)]
    pub command: LinkCommand,
}

/// Link subcommands
#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    /// Build a link from its parts
    Build {
        /// Compressed public key
        key: String,

        /// Destination type
        #[arg(short, long, default_value = "profile")]
        kind: KindArg,

        /// Base64 invite payload
        #[arg(short, long)]
        payload: Option<String>,

        /// Routing scheme
        #[arg(short, long, default_value = "universal")]
        scheme: SchemeArg,
    },

    /// Route a link through another scheme
    Convert {
        /// Link to convert
        link: String,

        /// Target scheme
        #[arg(short, long, default_value = "custom")]
        to: SchemeArg,
    },
}

/// Link scheme argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeArg {
    /// https://status.app/
    Universal,
    /// status-app://
    Custom,
}

impl From<SchemeArg> for LinkScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Universal => Self::Universal,
            SchemeArg::Custom => Self::Custom,
        }
    }
}

/// Link type argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    /// Profile (`u`)
    Profile,
    /// Community (`c`)
    Community,
    /// Community channel (`cc`)
    Channel,
}

impl From<KindArg> for LinkKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Profile => Self::Profile,
            KindArg::Community => Self::Community,
            KindArg::Channel => Self::Channel,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
