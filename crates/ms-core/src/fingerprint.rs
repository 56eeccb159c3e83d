//! SHA-256 fingerprint of a migration set, used to detect a new version of
//! the registered migrations.

use crate::migration::Migration;
use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Canonical token for one migration: `[id:order,forward,backward]`.
fn fingerprint_token(migration: &dyn Migration) -> String {
    format!(
        "[{}:{},{},{}]",
        migration.id(),
        migration.order(),
        migration.resolve_forward(),
        migration.resolve_backward()
    )
}

/// Fingerprint of migrations in the order given.
///
/// Registration order is part of the input: the same set registered in a
/// different order yields a different fingerprint.
pub fn compute_fingerprint<'a, I>(migrations: I) -> String
where
    I: IntoIterator<Item = &'a dyn Migration>,
{
    let canonical: String = migrations.into_iter().map(fingerprint_token).collect();
    compute_checksum(&canonical)
}

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod tests;
