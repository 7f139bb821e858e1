use super::{Command, TypedMessage};
use crate::codec::{Codec, CodecError};
use crate::core::{CmdError, CommandId, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Object-safe view of a decoded message body.
pub trait AnyMessage: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Any + fmt::Debug + Send + Sync> AnyMessage for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

/// Type alias for the decode capability stored in a descriptor.
pub type DecodeFn =
    Arc<dyn Fn(&[u8]) -> std::result::Result<Box<dyn AnyMessage>, CodecError> + Send + Sync>;

/// Type alias for the encode capability stored in a descriptor.
///
/// Receives the message as `&dyn Any`; the registry has already checked its
/// `TypeId` against the descriptor.
pub type EncodeFn =
    Arc<dyn Fn(&dyn Any) -> std::result::Result<Vec<u8>, CodecError> + Send + Sync>;

/// Immutable metadata plus decode/encode functions for one message variant.
#[derive(Clone)]
pub struct MessageDescriptor {
    cmd_id: CommandId,
    cmd_name: String,
    type_id: TypeId,
    type_name: &'static str,
    decode: DecodeFn,
    encode: Option<EncodeFn>,
}

impl MessageDescriptor {
    /// Descriptor for message type `M` with a caller-supplied decode function.
    ///
    /// No encoder is attached; the registry encodes such messages with its
    /// own codec unless one is added with [`with_encoder`](Self::with_encoder).
    pub fn new<M: Any>(cmd_id: impl Into<CommandId>, cmd_name: impl Into<String>, decode: DecodeFn) -> Self {
        Self {
            cmd_id: cmd_id.into(),
            cmd_name: cmd_name.into(),
            type_id: TypeId::of::<M>(),
            type_name: std::any::type_name::<M>(),
            decode,
            encode: None,
        }
    }

    pub fn with_encoder(mut self, encode: EncodeFn) -> Self {
        self.encode = Some(encode);
        self
    }

    /// Descriptor for a [`Command`] type, encoding and decoding through `codec`.
    pub fn of<M: Command, C: Codec>(codec: C) -> Self {
        Self::with_id::<M, C>(M::CMD_ID, M::CMD_NAME, codec)
    }

    /// Descriptor for any serde type under an explicit id.
    ///
    /// Both directions use `codec`, so bytes from the registry's `encode`
    /// always decode with this descriptor.
    pub fn with_id<M, C>(cmd_id: impl Into<CommandId>, cmd_name: impl Into<String>, codec: C) -> Self
    where
        M: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
        C: Codec,
    {
        let decoder = codec.clone();
        let decode: DecodeFn = Arc::new(move |bytes: &[u8]| -> std::result::Result<Box<dyn AnyMessage>, CodecError> {
            let message: M = decoder.decode(bytes)?;
            Ok(Box::new(message) as Box<dyn AnyMessage>)
        });
        let encode: EncodeFn = Arc::new(move |value: &dyn Any| -> std::result::Result<Vec<u8>, CodecError> {
            match value.downcast_ref::<M>() {
                Some(message) => codec.encode(message),
                None => Err(CodecError::Custom(format!(
                    "expected {}",
                    std::any::type_name::<M>()
                ))),
            }
        });
        Self::new::<M>(cmd_id, cmd_name, decode).with_encoder(encode)
    }

    pub fn cmd_id(&self) -> CommandId {
        self.cmd_id
    }

    pub fn cmd_name(&self) -> &str {
        &self.cmd_name
    }

    /// Type of the message this descriptor produces.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the message, for error messages and logs.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn has_encoder(&self) -> bool {
        self.encode.is_some()
    }

    pub(crate) fn decode_body(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<Box<dyn AnyMessage>, CodecError> {
        (self.decode)(bytes)
    }

    /// `None` when the descriptor carries no encoder.
    pub(crate) fn encode_body(
        &self,
        message: &dyn Any,
    ) -> Option<std::result::Result<Vec<u8>, CodecError>> {
        self.encode.as_ref().map(|encode| encode(message))
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("cmd_id", &self.cmd_id)
            .field("cmd_name", &self.cmd_name)
            .field("type_name", &self.type_name)
            .field("has_encoder", &self.encode.is_some())
            .finish_non_exhaustive()
    }
}

/// Decode capability for a single command id, as returned by `parser_for`.
#[derive(Debug, Clone)]
pub struct Decoder {
    descriptor: Arc<MessageDescriptor>,
}

impl Decoder {
    pub(crate) fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        Self { descriptor }
    }

    pub fn cmd_id(&self) -> CommandId {
        self.descriptor.cmd_id()
    }

    pub fn cmd_name(&self) -> &str {
        self.descriptor.cmd_name()
    }

    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Decode `payload` into this decoder's message type.
    pub fn decode(&self, payload: &[u8]) -> Result<TypedMessage> {
        match self.descriptor.decode_body(payload) {
            Ok(body) => Ok(TypedMessage::new(Arc::clone(&self.descriptor), body)),
            Err(source) => {
                tracing::debug!(
                    cmd_id = self.cmd_id().get(),
                    cmd_name = self.cmd_name(),
                    len = payload.len(),
                    error = %source,
                    "rejected malformed payload"
                );
                Err(CmdError::MalformedPayload {
                    cmd_id: self.cmd_id(),
                    cmd_name: self.cmd_name().to_string(),
                    source,
                })
            }
        }
    }
}
