//! Deterministic randomness derived from structural paths
//!
//! A node's seed depends only on its path, so rebuilding the same tree shape
//! reproduces every seed and every value drawn from it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::error::{AggregateError, AggregateResult};

/// First 8 bytes of the SHA-256 of `path`, big-endian.
pub fn path_hash(path: &str) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    i64::from_be_bytes(bytes)
}

/// Seed of the node at `path`: one draw from a generator seeded with its hash.
pub fn seed_for_path(path: &str) -> i64 {
    StdRng::seed_from_u64(path_hash(path) as u64).gen()
}

fn field_rng(seed: i64, local_seed: i64) -> StdRng {
    StdRng::seed_from_u64(31i64.wrapping_mul(seed).wrapping_add(local_seed) as u64)
}

/// Reproducible value in `[0, bound)` for one synthetic field of a node.
///
/// `local_seed` distinguishes the fields of a single node.
pub fn next_bounded_int(seed: i64, local_seed: i64, bound: u32) -> AggregateResult<u32> {
    if bound == 0 {
        return Err(AggregateError::InvalidBound);
    }
    Ok(field_rng(seed, local_seed).gen_range(0..bound))
}

/// Reproducible random-variant UUID for one field of a node.
pub fn seeded_uuid(seed: i64, local_seed: i64) -> Uuid {
    let bytes: [u8; 16] = field_rng(seed, local_seed).gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
