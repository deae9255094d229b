use anyhow::{Result, bail};
use std::collections::HashSet;

/// Seed used when no tokens are given.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve a list of CLI seed arguments into distinct numeric seeds.
///
/// Negative integers map to their magnitude. Order of first appearance is
/// kept and duplicates are dropped.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let seed = if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}
