//! Lineage fingerprints.
//!
//! A fingerprint is the SHA-256 of the concatenated binary digests of a
//! process and all of its ancestors, starting process first. It changes when
//! any executable in the lineage changes.

use sha2::{Digest, Sha256};

use crate::ancestry::{resolve_ancestry, AncestryChain, AncestryEnd};
use crate::error::{InspectError, Result};
use crate::process::ProcessTable;

/// Computes the fingerprint of `chain` as lowercase hex.
///
/// The chain must reach a root process, and every process in it must have
/// been fully inspected and carry a binary digest.
pub fn fingerprint(chain: &AncestryChain) -> Result<String> {
    match chain.end() {
        AncestryEnd::Root => {}
        AncestryEnd::MissingParent { pid, parent } => {
            return Err(InspectError::MissingAncestor { pid, parent })
        }
        AncestryEnd::Cycle { pid } => return Err(InspectError::CyclicAncestry { pid }),
    }

    let mut hasher = Sha256::new();
    for p in chain.processes() {
        if !p.has_permission {
            return Err(InspectError::MissingPermission { pid: p.id });
        }
        let checksum = p
            .checksum()
            .ok_or(InspectError::MissingChecksum { pid: p.id })?;
        hasher.update(checksum.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Resolves the ancestry of `pid` and fingerprints it.
pub fn fingerprint_process(table: &ProcessTable, pid: u32) -> Result<String> {
    let chain = resolve_ancestry(table, pid)?;
    fingerprint(&chain)
}
