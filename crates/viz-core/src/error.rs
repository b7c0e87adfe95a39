use thiserror::Error;

/// Errors that can occur while sourcing or transforming dataset records.
///
/// All of these are caught at the adapter / style-engine boundary and
/// converted into a log entry, an optional user-facing message and a
/// degraded-but-renderable result. Nothing here propagates past the
/// orchestrator.
#[derive(Error, Debug)]
pub enum VizError {
    #[error("fetch failed for {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    #[error("unable to parse {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("unknown plugin id: {0}")]
    UnknownPlugin(String),
}

impl VizError {
    /// Shorthand for a fetch failure against a given URI.
    pub fn fetch(uri: impl Into<String>, reason: impl ToString) -> Self {
        VizError::Fetch {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a parse failure with input context.
    pub fn parse(context: impl Into<String>, reason: impl ToString) -> Self {
        VizError::Parse {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}
