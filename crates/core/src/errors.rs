use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown {field} label `{value}`")]
    UnknownLabel { field: &'static str, value: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure reported by an item store or blob store implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid storage path `{0}`")]
    InvalidPath(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("cannot select from an empty item set")]
    EmptySet,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("image processing failure: {0}")]
    Processing(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Select image, type, and occasion",
            Self::ServiceUnavailable { .. } => {
                "The wardrobe store is unavailable right now. Please try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::ServiceUnavailable { .. } => "store_failure",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest { message: error.to_string() },
            ApplicationError::MissingInput(field) => {
                Self::BadRequest { message: format!("missing required field `{field}`") }
            }
            ApplicationError::Persistence(message) => Self::ServiceUnavailable { message },
            ApplicationError::Processing(message) | ApplicationError::Configuration(message) => {
                Self::Internal { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError, StoreError};

    #[test]
    fn unknown_label_maps_to_bad_request() {
        let interface = InterfaceError::from(ApplicationError::from(DomainError::UnknownLabel {
            field: "type",
            value: "Socks".to_owned(),
        }));

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref message } if message.contains("Socks")
        ));
        assert_eq!(interface.error_class(), "bad_request");
    }

    #[test]
    fn missing_input_has_user_safe_message() {
        let interface = InterfaceError::from(ApplicationError::MissingInput("type".to_owned()));

        assert_eq!(interface.user_message(), "Select image, type, and occasion");
    }

    #[test]
    fn store_failure_maps_to_service_unavailable() {
        let interface = InterfaceError::from(ApplicationError::from(StoreError::Backend(
            "database is locked".to_owned(),
        )));

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.error_class(), "store_failure");
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            InterfaceError::from(ApplicationError::Configuration("bad root dir".to_owned()));

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
