//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Domain errors describe a map document that cannot be converted.
#[derive(Error, Debug)]
pub enum DomainError {
    /// The map file is not valid JSON at all.
    #[error("could not load the MindMeister map file, is this a correct .mind file?")]
    NotJson {
        #[source]
        source: serde_json::Error,
    },

    /// The map file is JSON but not shaped like a MindMeister map.
    #[error("incorrect data format, is this a correct .mind file? ({reason})")]
    IncorrectFormat { reason: String },
}

impl DomainError {
    pub(crate) fn incorrect_format(reason: impl Into<String>) -> Self {
        Self::IncorrectFormat {
            reason: reason.into(),
        }
    }
}
