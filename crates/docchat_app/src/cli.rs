use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;

/// Chat with a PDF through a document question-answering service.
#[derive(Debug, Parser)]
#[command(name = "docchat", version)]
pub struct Cli {
    /// RON configuration file (defaults to ./docchat.ron when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base address of the service, overriding config and environment.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Document to select on start-up.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
