use crate::codec::{Codec, WireCodec};
use crate::core::{CmdError, CommandId, Result};
use crate::message::{Command, Decoder, TypedMessage};
use crate::registry::CommandRegistry;
use log::{info, warn};
use serde::Serialize;
use std::any::Any;
use std::sync::{Arc, OnceLock};

// Process-wide dispatcher: installed at most once, read-only afterwards
static GLOBAL_DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

/// Caller-facing entry point for decoding by command id.
///
/// Holds a frozen registry and forwards every call to it. Cloning is cheap;
/// clones share the same registry.
#[derive(Clone)]
pub struct Dispatcher<C: Codec = WireCodec> {
    registry: Arc<CommandRegistry<C>>,
}

impl Dispatcher<WireCodec> {
    /// Install `registry` as the process-wide dispatcher.
    ///
    /// The registry is frozen first. Fails with `DispatcherInstalled` if a
    /// dispatcher was already installed, or if [`Dispatcher::global`] was
    /// read before any install (it then pinned an empty registry).
    pub fn install_global(registry: CommandRegistry) -> Result<&'static Dispatcher> {
        let commands = registry.len();
        GLOBAL_DISPATCHER
            .set(Dispatcher::from_registry(registry))
            .map_err(|_| {
                warn!("Global dispatcher already installed, ignoring new registry");
                CmdError::DispatcherInstalled
            })?;
        info!("Installed global dispatcher with {} commands", commands);
        Ok(Self::global())
    }

    /// The process-wide dispatcher.
    ///
    /// Without a prior [`install_global`](Self::install_global) this is an
    /// empty registry, so every lookup reports `UnknownCommandId`.
    pub fn global() -> &'static Dispatcher {
        GLOBAL_DISPATCHER.get_or_init(|| {
            warn!("Global dispatcher read before install, using an empty registry");
            Dispatcher::from_registry(CommandRegistry::new())
        })
    }
}

impl<C: Codec> Dispatcher<C> {
    pub fn new(registry: Arc<CommandRegistry<C>>) -> Self {
        Self { registry }
    }

    pub fn from_registry(registry: CommandRegistry<C>) -> Self {
        Self::new(registry.into_shared())
    }

    pub fn registry(&self) -> &Arc<CommandRegistry<C>> {
        &self.registry
    }

    pub fn parser_for(&self, cmd_id: impl Into<CommandId>) -> Result<Decoder> {
        self.registry.parser_for(cmd_id)
    }

    pub fn decode(&self, cmd_id: impl Into<CommandId>, payload: &[u8]) -> Result<TypedMessage> {
        self.registry.decode(cmd_id, payload)
    }

    pub fn encode<M: Command>(&self, message: &M) -> Result<Vec<u8>> {
        self.registry.encode(message)
    }

    pub fn encode_as<T: Serialize + Any>(&self, cmd_id: impl Into<CommandId>, message: &T) -> Result<Vec<u8>> {
        self.registry.encode_as(cmd_id, message)
    }
}

impl<C: Codec + std::fmt::Debug> std::fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestReq {
        uid: String,
    }

    crate::command!(TestReq, 1001, "TestReq");

    #[test]
    fn test_from_registry_freezes() {
        let mut registry = CommandRegistry::new();
        registry.register_command::<TestReq>().unwrap();
        let dispatcher = Dispatcher::from_registry(registry);
        assert!(dispatcher.registry().is_frozen());
    }

    #[test]
    fn test_delegates_to_registry() {
        let mut registry = CommandRegistry::new();
        registry.register_command::<TestReq>().unwrap();
        let dispatcher = Dispatcher::from_registry(registry);

        let payload = dispatcher.encode(&TestReq { uid: "123321".into() }).unwrap();
        let message = dispatcher.decode(1001, &payload).unwrap();
        assert_eq!(message.cmd_name(), "TestReq");
        assert_eq!(dispatcher.parser_for(1001).unwrap().cmd_name(), "TestReq");
        assert!(matches!(
            dispatcher.parser_for(2).unwrap_err(),
            CmdError::UnknownCommandId(_)
        ));
    }

    #[test]
    fn test_clones_share_registry() {
        let dispatcher = Dispatcher::from_registry(CommandRegistry::new());
        let clone = dispatcher.clone();
        assert!(Arc::ptr_eq(dispatcher.registry(), clone.registry()));
    }
}
