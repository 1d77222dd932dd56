//! Check/result/fix protocol and orchestration engine for claw-doctor.
//!
//! Defines the result model every probe produces, the `Probe` contract,
//! the ordered probe registry, and the orchestrator that runs a diagnostic
//! pass and drives the optional remediation pass. Rendering is left to the
//! caller; this crate only exposes structural views.

pub mod check_result;
pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod registry;

pub use check_result::*;
pub use error::*;
pub use orchestrator::*;
pub use probe::*;
pub use registry::*;
