//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and a single exit path.

use std::fmt;
use std::path::PathBuf;
use std::process;
use tileforge::container::ContainerError;
use tileforge::pipeline::PipelineError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid argument combination
    Config(String),
    /// The output archive already exists
    OutputExists(PathBuf),
    /// Failed to install the interrupt handler
    SignalHandler(String),
    /// The render pipeline aborted
    Pipeline(PipelineError),
    /// Writing container metadata failed
    Metadata(ContainerError),
    /// The run completed but some tiles failed to render
    RenderFailures { failed: usize, enqueued: usize },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::OutputExists(path) => {
                eprintln!();
                eprintln!("Refusing to overwrite an existing archive. Either:");
                eprintln!("  1. Remove it: rm {}", path.display());
                eprintln!("  2. Pass a different output path");
            }
            CliError::RenderFailures { .. } => {
                eprintln!();
                eprintln!("Rendered tiles were kept; re-running will retry only the failures.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::OutputExists(path) => {
                write!(f, "Output archive '{}' already exists", path.display())
            }
            CliError::SignalHandler(msg) => {
                write!(f, "Failed to install interrupt handler: {}", msg)
            }
            CliError::Pipeline(e) => write!(f, "Render pipeline failed: {}", e),
            CliError::Metadata(e) => write!(f, "Failed to write metadata: {}", e),
            CliError::RenderFailures { failed, enqueued } => {
                write!(f, "{} of {} tiles failed to render", failed, enqueued)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pipeline(e) => Some(e),
            CliError::Metadata(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        match e {
            ContainerError::ArchiveExists(path) => CliError::OutputExists(path),
            other => CliError::Metadata(other),
        }
    }
}
