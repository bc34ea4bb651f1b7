pub mod add;
pub mod config;
pub mod context;
pub mod delete;
pub mod doctor;
pub mod list;
pub mod migrate;
pub mod pick;
pub mod rank;
pub mod sweep;
pub mod wear;

use serde::Serialize;
use serde_json::Value;

use wardrobe_core::errors::{ApplicationError, InterfaceError};
use wardrobe_core::lifecycle::LifecycleError;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            items: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_items<T>(command: &str, message: impl Into<String>, items: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let items = match serde_json::to_value(items) {
            Ok(items) => items,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            items: Some(items),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            items: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_interface(command: &str, error: &InterfaceError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), interface_exit_code(error))
    }

    /// Missing form input is reported with the user-facing prompt; everything else
    /// keeps the underlying detail.
    pub fn from_lifecycle(command: &str, error: LifecycleError) -> Self {
        let missing_input = matches!(error, LifecycleError::MissingInput { .. });
        let interface = InterfaceError::from(ApplicationError::from(error));
        if !missing_input {
            return Self::from_interface(command, &interface);
        }
        Self::failure(
            command,
            interface.error_class(),
            interface.user_message(),
            interface_exit_code(&interface),
        )
    }
}

fn interface_exit_code(error: &InterfaceError) -> u8 {
    match error {
        InterfaceError::BadRequest { .. } => 6,
        InterfaceError::ServiceUnavailable { .. } => 7,
        InterfaceError::Internal { .. } => 8,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
