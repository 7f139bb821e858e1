use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric wire identifier of a message type.
///
/// Any `i32` is a valid lookup key; only registered ids resolve to a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(i32);

impl CommandId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for CommandId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<CommandId> for i32 {
    fn from(id: CommandId) -> Self {
        id.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placeholder name used in logs for ids with no descriptor.
pub const UNKNOWN_CMD_NAME: &str = "<unknown cmd>";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_id_conversions() {
        let id: CommandId = (-7).into();
        assert_eq!(id.get(), -7);
        assert_eq!(i32::from(id), -7);
        assert_eq!(id.to_string(), "-7");
    }

    #[test]
    fn test_command_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&CommandId::new(1001)).unwrap();
        assert_eq!(json, "1001");

        let back: CommandId = serde_json::from_str("1001").unwrap();
        assert_eq!(back, CommandId::new(1001));
    }
}
