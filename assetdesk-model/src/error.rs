use thiserror::Error;

/// Errors produced while turning a raw document body into a model entity.
///
/// A parse failure only ever affects the single record it came from; callers
/// drop the record and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document {document_id} carried no body")]
    MissingBody { document_id: String },

    #[error("malformed document {document_id}: {reason}")]
    Malformed { document_id: String, reason: String },

    #[error("document {document_id} has unexpected type '{document_type}'")]
    UnexpectedType {
        document_id: String,
        document_type: String,
    },

    #[error("event for {expected} carried body of {found}")]
    IdentityMismatch { expected: String, found: String },

    #[error("document {document_id} has invalid field '{field}'")]
    InvalidField {
        document_id: String,
        field: &'static str,
    },
}

impl ParseError {
    pub fn malformed(
        document_id: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        ParseError::Malformed {
            document_id: document_id.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
