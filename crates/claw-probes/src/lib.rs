//! Concrete diagnostic probes for an OpenClaw installation.
//!
//! Every probe reads the machine through a shared `ProbeEnvironment` so
//! paths, search path, provider keys, endpoints and timeouts can be pinned
//! in tests. External commands and HTTP calls are always bounded by the
//! environment's timeouts.

pub mod cli_executable;
pub mod command;
pub mod environment;
pub mod probes;
pub mod registry;

pub use cli_executable::*;
pub use command::*;
pub use environment::*;
pub use probes::*;
pub use registry::*;
