use super::{AnyMessage, MessageDescriptor};
use crate::core::{CmdError, CommandId, Result};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A decoded message together with the descriptor that produced it.
pub struct TypedMessage {
    descriptor: Arc<MessageDescriptor>,
    body: Box<dyn AnyMessage>,
}

impl TypedMessage {
    pub(crate) fn new(descriptor: Arc<MessageDescriptor>, body: Box<dyn AnyMessage>) -> Self {
        Self { descriptor, body }
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

    fn body_any(&self) -> &dyn Any {
        // Deref to the trait object first; `self.body.as_any()` would pick the Box impl
        (*self.body).as_any()
    }

    pub fn is<M: Any>(&self) -> bool {
        self.body_any().is::<M>()
    }

    pub fn downcast_ref<M: Any>(&self) -> Result<&M> {
        self.body_any()
            .downcast_ref::<M>()
            .ok_or_else(|| self.wrong_variant::<M>())
    }

    /// Take the concrete message, failing with `WrongVariant` on mismatch.
    ///
    /// The message is consumed either way; check [`is`](Self::is) first to
    /// keep it around on a mismatch.
    pub fn into_message<M: Any>(self) -> Result<M> {
        let err = self.wrong_variant::<M>();
        self.body
            .into_any()
            .downcast::<M>()
            .map(|message| *message)
            .map_err(|_| err)
    }

    fn wrong_variant<M: Any>(&self) -> CmdError {
        CmdError::WrongVariant {
            cmd_id: self.cmd_id(),
            expected: std::any::type_name::<M>(),
            actual: self.descriptor.type_name(),
        }
    }
}

impl fmt::Debug for TypedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedMessage")
            .field("cmd_id", &self.cmd_id())
            .field("cmd_name", &self.cmd_name())
            .field("body", &self.body)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireCodec;
    use crate::message::Decoder;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestReq {
        uid: String,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestRsp {
        ok: bool,
    }

    crate::command!(TestReq, 1001, "TestReq");

    fn decoded() -> TypedMessage {
        let decoder = Decoder::new(Arc::new(MessageDescriptor::of::<TestReq, _>(WireCodec::Json)));
        decoder.decode(br#"{"uid":"123321"}"#).unwrap()
    }

    #[test]
    fn test_metadata_comes_from_descriptor() {
        let message = decoded();
        assert_eq!(message.cmd_id(), CommandId::new(1001));
        assert_eq!(message.cmd_name(), "TestReq");
        assert!(message.is::<TestReq>());
        assert!(!message.is::<TestRsp>());
    }

    #[test]
    fn test_downcast_ref_wrong_variant() {
        let message = decoded();
        let err = message.downcast_ref::<TestRsp>().unwrap_err();
        match err {
            CmdError::WrongVariant { cmd_id, expected, actual } => {
                assert_eq!(cmd_id, CommandId::new(1001));
                assert!(expected.ends_with("TestRsp"));
                assert!(actual.ends_with("TestReq"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_message_wrong_variant() {
        let err = decoded().into_message::<TestRsp>().unwrap_err();
        assert!(matches!(err, CmdError::WrongVariant { cmd_id, .. } if cmd_id.get() == 1001));

        let message = decoded();
        assert!(!message.is::<TestRsp>());
        let req = message.into_message::<TestReq>().unwrap();
        assert_eq!(req, TestReq { uid: "123321".into() });
    }

    #[test]
    fn test_debug_shows_body() {
        let text = format!("{:?}", decoded());
        assert!(text.contains("123321"));
        assert!(text.contains("TestReq"));
    }
}
