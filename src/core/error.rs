use crate::codec::CodecError;
use crate::core::CommandId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdError {
    #[error("Command id {cmd_id} already registered by '{existing}', rejected '{rejected}'")]
    DuplicateCommandId {
        cmd_id: CommandId,
        existing: String,
        rejected: String,
    },

    #[error("Command name '{cmd_name}' already registered with id {existing}, rejected id {rejected}")]
    DuplicateCommandName {
        cmd_name: String,
        existing: CommandId,
        rejected: CommandId,
    },

    #[error("Registry is frozen, cannot register '{cmd_name}' ({cmd_id})")]
    RegistryFrozen { cmd_id: CommandId, cmd_name: String },

    #[error("Unknown command id {0}")]
    UnknownCommandId(CommandId),

    #[error("Unknown command name '{0}'")]
    UnknownCommandName(String),

    #[error("Malformed payload for '{cmd_name}' ({cmd_id}): {source}")]
    MalformedPayload {
        cmd_id: CommandId,
        cmd_name: String,
        #[source]
        source: CodecError,
    },

    #[error("Wrong variant for command {cmd_id}: expected {expected}, message is {actual}")]
    WrongVariant {
        cmd_id: CommandId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to encode command {cmd_id}: {source}")]
    Encode {
        cmd_id: CommandId,
        #[source]
        source: CodecError,
    },

    #[error("Global dispatcher already installed")]
    DispatcherInstalled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CmdError {
    /// True for per-message failures at the serving boundary.
    ///
    /// A serving loop can drop the offending message and keep going; the
    /// remaining variants are bootstrap or programming errors.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CmdError::UnknownCommandId(_)
                | CmdError::MalformedPayload { .. }
                | CmdError::WrongVariant { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CmdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(CmdError::UnknownCommandId(CommandId::new(9)).is_recoverable());
        assert!(
            CmdError::MalformedPayload {
                cmd_id: CommandId::new(1),
                cmd_name: "Ping".into(),
                source: CodecError::TrailingBytes(3),
            }
            .is_recoverable()
        );
        assert!(!CmdError::DispatcherInstalled.is_recoverable());
        assert!(
            !CmdError::RegistryFrozen {
                cmd_id: CommandId::new(1),
                cmd_name: "Ping".into(),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_error_messages_name_the_command() {
        let err = CmdError::DuplicateCommandId {
            cmd_id: CommandId::new(1001),
            existing: "TestReq".into(),
            rejected: "OtherReq".into(),
        };
        let text = err.to_string();
        assert!(text.contains("1001"));
        assert!(text.contains("TestReq"));
        assert!(text.contains("OtherReq"));
    }
}
