//! CLI command implementations

pub(crate) mod common;
pub(crate) mod detect;
pub(crate) mod migrate;
pub(crate) mod relocate;
