//! Top-level analysis container.

use crate::module::ModuleAnalysis;
use serde::{Deserialize, Serialize};
use vela_common::ContentHash;

/// Version of the IR field set. Bumped whenever a serialized field is added,
/// removed or changes meaning.
pub const IR_VERSION: u32 = 1;

/// Analyses of every non-fatal module in one source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignAnalysis {
    /// [`IR_VERSION`] at the time of production.
    pub version: u32,
    /// Module analyses in source order.
    pub modules: Vec<ModuleAnalysis>,
    /// Hash of the serialized `modules`.
    pub fingerprint: ContentHash,
}

impl DesignAnalysis {
    /// Wraps `modules`, stamping the version and fingerprint.
    pub fn new(modules: Vec<ModuleAnalysis>) -> Self {
        Self {
            version: IR_VERSION,
            fingerprint: fingerprint(&modules),
            modules,
        }
    }

    /// Finds a module analysis by name.
    pub fn module(&self, name: &str) -> Option<&ModuleAnalysis> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Number of analyzed modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

/// Hash of the JSON encoding of `modules`. Should encoding ever fail, the
/// `Debug` form is hashed instead so distinct designs stay distinct.
fn fingerprint(modules: &[ModuleAnalysis]) -> ContentHash {
    match serde_json::to_vec(modules) {
        Ok(bytes) => ContentHash::from_bytes(&bytes),
        Err(e) => {
            log::warn!("cannot encode IR for fingerprinting ({e}); hashing its debug form");
            ContentHash::from_bytes(format!("{modules:?}").as_bytes())
        }
    }
}
