use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("required field `{field}` is empty")]
    MissingField { field: &'static str },
    #[error("unknown {kind} `{value}`")]
    UnknownValue { kind: &'static str, value: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("rendering failure: {0}")]
    Rendering(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

/// The operation the caller was attempting when a failure surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
    Generate,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String, operation: Operation },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Please fill in all required fields and try again.",
            Self::ServiceUnavailable { operation, .. } => match operation {
                Operation::Load => "Failed to Load",
                Operation::Create => "Failed to Create",
                Operation::Update => "Failed to Update",
                Operation::Delete => "Failed to Delete",
                Operation::Generate => "Failed to Generate",
            },
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(
        self,
        operation: Operation,
        correlation_id: impl Into<String>,
    ) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Domain(error) => {
                InterfaceError::BadRequest { message: error.to_string(), correlation_id }
            }
            Self::Persistence(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id, operation }
            }
            Self::Rendering(message) | Self::Configuration(message) => {
                InterfaceError::Internal { message, correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError, Operation};

    #[test]
    fn missing_field_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::MissingField { field: "description" })
            .into_interface(Operation::Generate, "req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ref message,
            } if correlation_id == "req-1" && message.contains("description")
        ));
        assert_eq!(interface.user_message(), "Please fill in all required fields and try again.");
    }

    #[test]
    fn persistence_error_reports_generic_operation_message() {
        let load = ApplicationError::Persistence("database lock timeout".to_owned())
            .into_interface(Operation::Load, "req-2");
        let delete = ApplicationError::Persistence("no such table".to_owned())
            .into_interface(Operation::Delete, "req-3");

        assert!(matches!(load, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(load.user_message(), "Failed to Load");
        assert_eq!(delete.user_message(), "Failed to Delete");
    }

    #[test]
    fn rendering_error_maps_to_internal() {
        let interface = ApplicationError::Rendering("template missing".to_owned())
            .into_interface(Operation::Generate, "req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
