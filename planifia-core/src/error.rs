use thiserror::Error;

/// Errors raised by the reminder core.
///
/// None of these abort a planning cycle: date failures degrade a single task,
/// analysis failures end the cycle with an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderError {
    #[error("invalid due date '{input}': {source}")]
    DateParse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid reminder policy: {0}")]
    InvalidPolicy(String),

    #[error("task analysis failed: {0}")]
    AnalysisFailed(String),
}
