//! Benchmark seed profiles for polycube enumeration.
//!
//! - [`seed_profile`]: every canonical key of one size, grown on the
//!   calling thread, for use as benchmark input.
//! - [`pool_profile`]: a quiet [`RunConfig`] for pool benchmarks.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use polycube_core::Key;
use polycube_engine::RunConfig;
use polycube_grow::LevelChain;

/// Every canonical key of `length` cells, in emission order.
///
/// Lengths 1 and 2 return their single base shape.
pub fn seed_profile(length: usize) -> Vec<Key> {
    match length {
        0 => Vec::new(),
        1 => vec![Key::single()],
        2 => vec![Key::base()],
        _ => {
            let mut chain = LevelChain::new(2, length);
            chain.load(&[Key::base()]);
            let mut keys = Vec::new();
            chain.drain(|batch| keys.extend_from_slice(batch));
            keys
        }
    }
}

/// A pool configuration growing `input` to `output` on `threads` threads
/// with progress logging off.
pub fn pool_profile(input: usize, output: usize, threads: usize) -> RunConfig {
    RunConfig {
        threads: Some(threads),
        progress: false,
        ..RunConfig::new(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_profile_sizes() {
        assert_eq!(seed_profile(1).len(), 1);
        assert_eq!(seed_profile(2).len(), 1);
        assert_eq!(seed_profile(5).len(), 29);
        assert!(seed_profile(6).iter().all(|k| k.len() == 6));
    }

    #[test]
    fn pool_profile_validates() {
        let config = pool_profile(5, 8, 4);
        config.validate().unwrap();
        assert_eq!(config.resolved_thread_count(), 4);
    }
}
