//! dbu-core - Core library for the database upgrade tool
//!
//! This crate provides the installation layout, the reader for the server's
//! INI config files, server version handling, and detection of which
//! database backend an installation is configured for.

pub mod backend;
pub mod config;
pub mod detect;
pub mod environment;
pub mod error;
pub mod subsystem;
pub mod version;

pub use backend::{BackendKind, ConnectionInfo};
pub use config::ConfigReader;
pub use detect::{BackendDetector, ConfigLayout, Detection, SubsystemBackend};
pub use environment::EnvironmentContext;
pub use error::{CoreError, CoreResult};
pub use subsystem::{ccnet_component, CcnetComponent, Subsystem, CCNET_COMPONENTS};
pub use version::ServerVersion;
