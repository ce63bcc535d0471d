//! Error types for the `monopoly-sim` binary.
//!
//! [`CliError`] wraps every failure mode of startup and of the two run
//! modes so that `main` can propagate with `?`.

/// Top-level error for the terminal front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: monopoly_core::ConfigError,
    },

    /// The engine could not be built or started.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: monopoly_core::EngineError,
    },

    /// Writing to the terminal failed.
    #[error("terminal I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing the JSON report failed.
    #[error("report serialization error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Every sender of the UI event channel went away.
    #[error("event channel closed before the simulation finished")]
    EventChannelClosed,
}
