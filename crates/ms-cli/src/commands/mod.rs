//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod common;
pub(crate) mod fingerprint;
pub(crate) mod init;
pub(crate) mod revert;
pub(crate) mod status;

#[cfg(test)]
#[path = "test_fixtures.rs"]
pub(crate) mod test_fixtures;
