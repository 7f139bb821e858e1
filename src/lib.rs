// ============================================================================
// cmdwire Library
// ============================================================================

pub mod core;
pub mod codec;
pub mod message;
pub mod registry;
pub mod manifest;
pub mod facade;

// Re-export main types for convenience
pub use crate::core::{CmdError, CommandId, Result};
pub use codec::{Codec, CodecError, WireCodec};
pub use message::{Command, Decoder, MessageDescriptor, TypedMessage};
pub use registry::CommandRegistry;
pub use manifest::{CommandManifest, ManifestMismatch, ManifestReport};
pub use facade::{Dispatcher, decode, parser_for};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestReq {
        uid: String,
    }

    crate::command!(TestReq, 1001, "TestReq");

    #[test]
    fn test_bootstrap_then_decode() {
        let mut registry = CommandRegistry::new();
        crate::register_commands!(registry; TestReq).unwrap();
        let dispatcher = Dispatcher::from_registry(registry);

        let payload = dispatcher.encode(&TestReq { uid: "123321".into() }).unwrap();
        let message = dispatcher.decode(1001, &payload).unwrap();

        assert_eq!(message.cmd_id(), CommandId::new(1001));
        assert_eq!(message.cmd_name(), "TestReq");
        assert_eq!(
            message.into_message::<TestReq>().unwrap(),
            TestReq { uid: "123321".into() }
        );
    }
}
