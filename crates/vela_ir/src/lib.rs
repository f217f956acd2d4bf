//! Vela IR: per-module analysis records produced by the front end.
//!
//! A [`DesignAnalysis`] holds one [`ModuleAnalysis`] per module that parsed
//! without fatal errors. Records are plain data with owned names so they can
//! be serialized, compared and cached independently of the parse that
//! produced them. The field set is a versioned contract: any change to it
//! bumps [`IR_VERSION`].

#![warn(missing_docs)]

pub mod design;
pub mod instance;
pub mod module;
pub mod port;
pub mod process;
pub mod stats;

pub use design::{DesignAnalysis, IR_VERSION};
pub use instance::{ConnectionInfo, InstanceInfo};
pub use module::{ModuleAnalysis, SignalInfo, SignalKind};
pub use port::{PortDirection, PortInfo};
pub use process::{Edge, ProcessKind, ProcessSummary};
pub use stats::{complexity_score, ModuleStatistics};
