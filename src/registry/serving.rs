use super::CommandRegistry;
use crate::codec::Codec;
use crate::core::{CmdError, CommandId, Result, UNKNOWN_CMD_NAME};
use crate::message::{Command, Decoder, MessageDescriptor, TypedMessage};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::sync::Arc;

impl<C: Codec> CommandRegistry<C> {
    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Decoder for `cmd_id`, or `UnknownCommandId`.
    pub fn parser_for(&self, cmd_id: impl Into<CommandId>) -> Result<Decoder> {
        let cmd_id = cmd_id.into();
        self.descriptors
            .get(&cmd_id)
            .map(|descriptor| Decoder::new(Arc::clone(descriptor)))
            .ok_or(CmdError::UnknownCommandId(cmd_id))
    }

    /// Decode `payload` as the message registered under `cmd_id`.
    pub fn decode(&self, cmd_id: impl Into<CommandId>, payload: &[u8]) -> Result<TypedMessage> {
        self.parser_for(cmd_id)?.decode(payload)
    }

    /// Serialize a [`Command`] through its registered descriptor.
    pub fn encode<M: Command>(&self, message: &M) -> Result<Vec<u8>> {
        self.encode_as(M::CMD_ID, message)
    }

    /// Serialize `message` for `cmd_id`.
    ///
    /// The id must be registered for exactly this type, otherwise the peer
    /// would decode the bytes as something else. Encoding uses the
    /// descriptor's own encoder, so the bytes always decode with the same
    /// descriptor; descriptors without one fall back to the registry codec.
    pub fn encode_as<T>(&self, cmd_id: impl Into<CommandId>, message: &T) -> Result<Vec<u8>>
    where
        T: Serialize + Any,
    {
        let cmd_id = cmd_id.into();
        let descriptor = self
            .descriptors
            .get(&cmd_id)
            .ok_or(CmdError::UnknownCommandId(cmd_id))?;

        if MessageDescriptor::type_id(descriptor) != TypeId::of::<T>() {
            return Err(CmdError::WrongVariant {
                cmd_id,
                expected: descriptor.type_name(),
                actual: std::any::type_name::<T>(),
            });
        }

        descriptor
            .encode_body(message)
            .unwrap_or_else(|| self.codec.encode(message))
            .map_err(|source| CmdError::Encode { cmd_id, source })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains(&self, cmd_id: impl Into<CommandId>) -> bool {
        self.descriptors.contains_key(&cmd_id.into())
    }

    /// All registered ids, ascending.
    pub fn cmd_ids(&self) -> Vec<CommandId> {
        let mut ids: Vec<CommandId> = self.descriptors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn cmd_name(&self, cmd_id: impl Into<CommandId>) -> Option<&str> {
        self.descriptors
            .get(&cmd_id.into())
            .map(|descriptor| descriptor.cmd_name())
    }

    /// Reverse lookup for diagnostics; decoding is always keyed by id.
    pub fn cmd_id(&self, cmd_name: &str) -> Option<CommandId> {
        self.names.get(cmd_name).copied()
    }

    /// Name for log lines; unknown ids render as `<unknown cmd>`.
    pub fn display_name(&self, cmd_id: impl Into<CommandId>) -> &str {
        self.cmd_name(cmd_id).unwrap_or(UNKNOWN_CMD_NAME)
    }

    pub fn descriptor(&self, cmd_id: impl Into<CommandId>) -> Option<&Arc<MessageDescriptor>> {
        self.descriptors.get(&cmd_id.into())
    }

    /// Descriptors ordered by command id.
    pub fn descriptors(&self) -> Vec<&Arc<MessageDescriptor>> {
        let mut descriptors: Vec<_> = self.descriptors.values().collect();
        descriptors.sort_unstable_by_key(|descriptor| descriptor.cmd_id());
        descriptors
    }
}
