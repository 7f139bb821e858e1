//! Name → command id table shared between peers.
//!
//! The manifest is plain JSON:
//!
//! ```json
//! { "TestReq": 1001, "TestRsp": 1002, "TestRsp.TransformInfo": 1003 }
//! ```
//!
//! It is read once before bootstrap. Registration can take ids from it
//! (`CommandRegistry::register_from_manifest`) and a built registry can be
//! checked against it with [`CommandManifest::verify`].

use crate::codec::Codec;
use crate::core::{CmdError, CommandId, Result};
use crate::registry::CommandRegistry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandManifest {
    entries: BTreeMap<String, CommandId>,
}

impl CommandManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn with(mut self, cmd_name: &str, cmd_id: i32) -> Self {
        self.entries.insert(cmd_name.to_string(), CommandId::new(cmd_id));
        self
    }

    /// Parse and validate a JSON manifest
    pub fn from_json_str(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| CmdError::Config(format!("Invalid command manifest: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let manifest = Self::from_json_str(&json)?;
        info!(
            "Loaded command manifest {} ({} commands)",
            path.display(),
            manifest.len()
        );
        Ok(manifest)
    }

    /// Every id must belong to exactly one name.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<CommandId, &str> = HashMap::new();
        for (name, id) in &self.entries {
            if let Some(other) = seen.insert(*id, name) {
                return Err(CmdError::Config(format!(
                    "Command id {} assigned to both '{}' and '{}'",
                    id, other, name
                )));
            }
        }
        Ok(())
    }

    pub fn cmd_id(&self, cmd_name: &str) -> Option<CommandId> {
        self.entries.get(cmd_name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CommandId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Compare a registry against this manifest.
    pub fn verify<C: Codec>(&self, registry: &CommandRegistry<C>) -> ManifestReport {
        let mut mismatches = Vec::new();

        for (name, cmd_id) in self.iter() {
            match registry.cmd_name(cmd_id) {
                None => match registry.cmd_id(name) {
                    Some(registered_id) => mismatches.push(ManifestMismatch::Moved {
                        cmd_name: name.to_string(),
                        manifest_id: cmd_id,
                        registered_id,
                    }),
                    None => mismatches.push(ManifestMismatch::Missing {
                        cmd_name: name.to_string(),
                        cmd_id,
                    }),
                },
                Some(registered) if registered != name => {
                    mismatches.push(ManifestMismatch::Renamed {
                        cmd_id,
                        expected: name.to_string(),
                        registered: registered.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        for descriptor in registry.descriptors() {
            if self.cmd_id(descriptor.cmd_name()).is_none() {
                mismatches.push(ManifestMismatch::Unlisted {
                    cmd_id: descriptor.cmd_id(),
                    cmd_name: descriptor.cmd_name().to_string(),
                });
            }
        }

        for mismatch in &mismatches {
            warn!("Command manifest mismatch: {}", mismatch);
        }

        ManifestReport { mismatches }
    }

    /// Like [`verify`](Self::verify) but fails on any mismatch.
    pub fn verify_strict<C: Codec>(&self, registry: &CommandRegistry<C>) -> Result<()> {
        let report = self.verify(registry);
        if report.is_clean() {
            return Ok(());
        }
        let details: Vec<String> = report.mismatches.iter().map(|m| m.to_string()).collect();
        Err(CmdError::Config(format!(
            "Registry does not match command manifest: {}",
            details.join("; ")
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestMismatch {
    /// Listed in the manifest, not registered under any id
    Missing { cmd_name: String, cmd_id: CommandId },
    /// Name registered under a different id than the manifest assigns
    Moved {
        cmd_name: String,
        manifest_id: CommandId,
        registered_id: CommandId,
    },
    /// Id registered under a different name
    Renamed {
        cmd_id: CommandId,
        expected: String,
        registered: String,
    },
    /// Registered but absent from the manifest
    Unlisted { cmd_id: CommandId, cmd_name: String },
}

impl fmt::Display for ManifestMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestMismatch::Missing { cmd_name, cmd_id } => {
                write!(f, "'{}' ({}) is not registered", cmd_name, cmd_id)
            }
            ManifestMismatch::Moved { cmd_name, manifest_id, registered_id } => write!(
                f,
                "'{}' is {} in the manifest but registered as {}",
                cmd_name, manifest_id, registered_id
            ),
            ManifestMismatch::Renamed { cmd_id, expected, registered } => write!(
                f,
                "id {} is '{}' in the manifest but registered as '{}'",
                cmd_id, expected, registered
            ),
            ManifestMismatch::Unlisted { cmd_id, cmd_name } => {
                write!(f, "'{}' ({}) is not in the manifest", cmd_name, cmd_id)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManifestReport {
    pub mismatches: Vec<ManifestMismatch>,
}

impl ManifestReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}
