//! Child module instances.

use serde::{Deserialize, Serialize};

/// One port connection of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Formal port name; `None` for positional connections.
    pub port: Option<String>,
    /// Source text of the connected expression; `None` for `.p()`.
    pub signal: Option<String>,
}

/// A module instantiation, recorded by name without elaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Name of the instantiated module.
    pub module: String,
    /// Instance name.
    pub name: String,
    /// Connections in source order.
    pub connections: Vec<ConnectionInfo>,
}

impl InstanceInfo {
    /// The actual connected to formal `port`, if connected by name.
    pub fn connection(&self, port: &str) -> Option<&ConnectionInfo> {
        self.connections
            .iter()
            .find(|c| c.port.as_deref() == Some(port))
    }
}
