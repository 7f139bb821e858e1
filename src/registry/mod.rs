//! Command id → message descriptor registry.
//!
//! A registry has two phases. During bootstrap it is mutated through
//! `&mut self` (`register*`). After [`CommandRegistry::freeze`] registration
//! is rejected and the registry is usually shared behind an `Arc`, where all
//! lookups take `&self` and run without locking.

mod serving;

use crate::codec::{Codec, WireCodec};
use crate::core::{CmdError, CommandId, Result};
use crate::manifest::CommandManifest;
use crate::message::{Command, MessageDescriptor};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub struct CommandRegistry<C: Codec = WireCodec> {
    codec: C,
    descriptors: HashMap<CommandId, Arc<MessageDescriptor>>,
    /// Name → id, for uniqueness and diagnostics; never used to decode
    names: HashMap<String, CommandId>,
    frozen: bool,
}

impl CommandRegistry<WireCodec> {
    /// Empty registry using MessagePack.
    pub fn new() -> Self {
        Self::with_codec(WireCodec::default())
    }
}

impl Default for CommandRegistry<WireCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> CommandRegistry<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            descriptors: HashMap::new(),
            names: HashMap::new(),
            frozen: false,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Insert a descriptor.
    ///
    /// Rejected descriptors leave the registry untouched: the first
    /// registration of an id (or name) always wins.
    pub fn register(&mut self, descriptor: MessageDescriptor) -> Result<()> {
        if self.frozen {
            return Err(CmdError::RegistryFrozen {
                cmd_id: descriptor.cmd_id(),
                cmd_name: descriptor.cmd_name().to_string(),
            });
        }

        if let Some(existing) = self.descriptors.get(&descriptor.cmd_id()) {
            tracing::warn!(
                cmd_id = descriptor.cmd_id().get(),
                existing = existing.cmd_name(),
                rejected = descriptor.cmd_name(),
                "duplicate command id"
            );
            return Err(CmdError::DuplicateCommandId {
                cmd_id: descriptor.cmd_id(),
                existing: existing.cmd_name().to_string(),
                rejected: descriptor.cmd_name().to_string(),
            });
        }

        if let Some(existing) = self.names.get(descriptor.cmd_name()) {
            tracing::warn!(
                cmd_name = descriptor.cmd_name(),
                existing = existing.get(),
                rejected = descriptor.cmd_id().get(),
                "duplicate command name"
            );
            return Err(CmdError::DuplicateCommandName {
                cmd_name: descriptor.cmd_name().to_string(),
                existing: *existing,
                rejected: descriptor.cmd_id(),
            });
        }

        tracing::debug!(
            cmd_id = descriptor.cmd_id().get(),
            cmd_name = descriptor.cmd_name(),
            type_name = descriptor.type_name(),
            "registered command"
        );
        self.names
            .insert(descriptor.cmd_name().to_string(), descriptor.cmd_id());
        self.descriptors
            .insert(descriptor.cmd_id(), Arc::new(descriptor));
        Ok(())
    }

    /// Register a [`Command`] type using this registry's codec.
    pub fn register_command<M: Command>(&mut self) -> Result<()> {
        self.register(MessageDescriptor::of::<M, C>(self.codec.clone()))
    }

    /// Register `M` under the id the manifest assigns to `cmd_name`.
    pub fn register_from_manifest<M>(&mut self, manifest: &CommandManifest, cmd_name: &str) -> Result<()>
    where
        M: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
    {
        let cmd_id = manifest
            .cmd_id(cmd_name)
            .ok_or_else(|| CmdError::UnknownCommandName(cmd_name.to_string()))?;
        self.register(MessageDescriptor::with_id::<M, C>(
            cmd_id,
            cmd_name,
            self.codec.clone(),
        ))
    }

    /// Stop accepting registrations. Calling it again does nothing.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.frozen = true;
        tracing::info!(
            commands = self.descriptors.len(),
            codec = self.codec.name(),
            "command registry frozen"
        );
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze and move the registry behind an `Arc` for the serving phase.
    pub fn into_shared(mut self) -> Arc<Self> {
        self.freeze();
        Arc::new(self)
    }
}

impl<C: Codec + fmt::Debug> fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("codec", &self.codec)
            .field("commands", &self.cmd_ids())
            .field("frozen", &self.frozen)
            .finish()
    }
}
