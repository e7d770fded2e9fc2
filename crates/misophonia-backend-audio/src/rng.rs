//! Deterministic RNG using PCG32 with BLAKE3 seed derivation.
//!
//! Every random decision of the pipeline flows through generators created
//! here. There is no process-wide generator: the planner owns one generator
//! seeded from the master seed, and each mix owns one generator seeded from
//! the per-item seed the planner drew for it.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
///
/// # Arguments
/// * `seed` - A 32-bit seed value
///
/// # Returns
/// A deterministically initialized PCG32 generator
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives a seed for a named component from a base seed.
///
/// Uses BLAKE3 to hash the base seed concatenated with the key, so that
/// independent stages (e.g. pair sampling per category) get independent
/// streams from one user-facing seed.
///
/// # Arguments
/// * `base_seed` - The master seed
/// * `key` - A string identifier for the component (e.g. "controls")
///
/// # Returns
/// A derived u32 seed
pub fn derive_component_seed(base_seed: u32, key: &str) -> u32 {
    let mut input = Vec::with_capacity(4 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);

    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&hash.as_bytes()[0..4]);
    u32::from_le_bytes(bytes)
}

/// Creates an RNG for a named component.
pub fn create_component_rng(base_seed: u32, key: &str) -> Pcg32 {
    create_rng(derive_component_seed(base_seed, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);

        let values1: Vec<u32> = (0..100).map(|_| rng1.gen()).collect();
        let values2: Vec<u32> = (0..100).map(|_| rng2.gen()).collect();

        assert_eq!(values1, values2);
    }

    #[test]
    fn test_different_seeds_produce_different_sequences() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(43);

        let values1: Vec<u32> = (0..10).map(|_| rng1.gen()).collect();
        let values2: Vec<u32> = (0..10).map(|_| rng2.gen()).collect();

        assert_ne!(values1, values2);
    }

    #[test]
    fn test_component_seed_derivation() {
        let seed_a = derive_component_seed(42, "chewing");
        let seed_b = derive_component_seed(42, "typing");
        assert_ne!(seed_a, seed_b);
        assert_eq!(seed_a, derive_component_seed(42, "chewing"));
        assert_ne!(seed_a, derive_component_seed(43, "chewing"));
    }

    #[test]
    fn test_component_rng_matches_manual_derivation() {
        let mut a = create_component_rng(7, "controls");
        let mut b = create_rng(derive_component_seed(7, "controls"));
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }
}
