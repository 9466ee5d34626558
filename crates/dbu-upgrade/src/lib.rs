//! dbu-upgrade - Upgrade orchestration for the database upgrade tool
//!
//! This crate ties configuration, detection and script application
//! together: it checks that the server is stopped, moves legacy config into
//! the central directory on request, finds the scripts for the target
//! version, and applies them to each subsystem in order.

pub mod dispatcher;
pub mod error;
pub mod liveness;
pub mod locator;
pub mod relocate;
pub mod report;

pub use dispatcher::{MigrationDispatcher, MigrationOptions};
pub use error::{UpgradeError, UpgradeResult};
pub use liveness::{ControlEndpoint, LivenessGuard};
pub use locator::ScriptLocator;
pub use relocate::{ConfigRelocator, MovedConfig, RelocationOutcome};
pub use report::{MigrationReport, OutcomeStatus, SkipReason, SubsystemOutcome};
