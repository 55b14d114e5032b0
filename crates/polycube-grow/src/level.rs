//! Multi-level growth chain.
//!
//! A [`LevelChain`] grows a batch of seeds of length `input` all the way to
//! length `output` without recursion. Level `i` turns one seed at a time
//! into the accepted children of length `input + i + 1`; its output buffer
//! is the seed buffer of level `i + 1`. Each call to
//! [`LevelChain::process_chunk`] resumes the deepest level that still has
//! seeds, regenerates every level below it, and returns the deepest level's
//! output.
//!
//! Memory per chain is one output buffer per level, each bounded by
//! [`MAX_FANOUT`], regardless of how many shapes the run discovers.

use polycube_core::{Key, Spacemap};

use crate::filter::is_canonical_growth;
use crate::generator::{Generator, MAX_FANOUT};

/// One level of a growth chain.
#[derive(Debug)]
pub struct GenerationLevel {
    new_length: usize,
    seed_count: usize,
    index: usize,
    output: Vec<Key>,
}

impl GenerationLevel {
    /// A level producing keys of `new_length`.
    pub fn new(new_length: usize) -> Self {
        GenerationLevel {
            new_length,
            seed_count: 0,
            index: 0,
            output: Vec::with_capacity(MAX_FANOUT),
        }
    }

    /// Length of the keys this level produces.
    pub fn new_length(&self) -> usize {
        self.new_length
    }

    /// Whether every seed has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.seed_count
    }

    /// Accepted children of the most recently processed seed.
    pub fn output(&self) -> &[Key] {
        &self.output
    }

    fn reset(&mut self, seed_count: usize) {
        self.seed_count = seed_count;
        self.index = 0;
    }

    /// Grow `seeds[index]`, keep only canonical children, and advance.
    ///
    /// Children are sorted so duplicates sit together. A duplicate of an
    /// accepted key is dropped; a duplicate of a rejected key is still
    /// checked, since it may carry a different source index.
    fn advance(&mut self, seeds: &[Key], generator: &mut Generator, spacemap: &mut Spacemap) {
        let seed = seeds[self.index];
        self.index += 1;

        self.output.clear();
        generator.generate(&seed, &mut self.output);
        debug_assert!(self.output.iter().all(|k| k.len() == self.new_length));
        self.output.sort_unstable();

        let mut kept = 0;
        let mut last_kept = false;
        for j in 0..self.output.len() {
            let key = self.output[j];
            if last_kept && self.output[kept - 1] == key {
                continue;
            }
            last_kept = is_canonical_growth(&key, spacemap);
            if last_kept {
                self.output[kept] = key;
                kept += 1;
            }
        }
        self.output.truncate(kept);
    }
}

/// A per-worker growth chain from `input_length` to `output_length`.
pub struct LevelChain {
    input_length: usize,
    seeds: Vec<Key>,
    levels: Vec<GenerationLevel>,
    generator: Generator,
    spacemap: Spacemap,
}

impl LevelChain {
    /// A chain growing keys of `input_length` to `output_length`.
    ///
    /// Requires `input_length >= 1` and `output_length > input_length`;
    /// callers validate this through their run configuration.
    pub fn new(input_length: usize, output_length: usize) -> Self {
        debug_assert!(input_length >= 1 && output_length > input_length);
        LevelChain {
            input_length,
            seeds: Vec::new(),
            levels: (input_length + 1..=output_length)
                .map(GenerationLevel::new)
                .collect(),
            generator: Generator::new(),
            spacemap: Spacemap::new(),
        }
    }

    /// Length of the seeds the chain accepts.
    pub fn input_length(&self) -> usize {
        self.input_length
    }

    /// Length of the keys the chain emits.
    pub fn output_length(&self) -> usize {
        self.input_length + self.levels.len()
    }

    /// The levels, shallowest first.
    pub fn levels(&self) -> &[GenerationLevel] {
        &self.levels
    }

    /// The top-level seed buffer, for the caller to refill.
    ///
    /// Call [`start`](Self::start) after changing it.
    pub fn seeds_mut(&mut self) -> &mut Vec<Key> {
        &mut self.seeds
    }

    /// Reset every level and begin consuming the current seed buffer.
    pub fn start(&mut self) {
        let seed_count = self.seeds.len();
        for level in &mut self.levels {
            level.reset(0);
        }
        if let Some(top) = self.levels.first_mut() {
            top.reset(seed_count);
        }
    }

    /// Replace the seed buffer and [`start`](Self::start).
    pub fn load(&mut self, seeds: &[Key]) {
        self.seeds.clear();
        self.seeds.extend_from_slice(seeds);
        self.start();
    }

    /// Produce the next batch of accepted output keys.
    ///
    /// Returns `None` once every seed has been fully grown. A returned
    /// slice may be empty.
    pub fn process_chunk(&mut self) -> Option<&[Key]> {
        let LevelChain {
            seeds,
            levels,
            generator,
            spacemap,
            ..
        } = self;
        let depth = levels.len();

        let mut resume = depth - 1;
        loop {
            if !levels[resume].is_exhausted() {
                break;
            }
            levels[resume].index = 0;
            if resume == 0 {
                return None;
            }
            resume -= 1;
        }

        for i in resume..depth {
            let (above, rest) = levels.split_at_mut(i);
            let level = &mut rest[0];
            if level.seed_count > 0 {
                let input: &[Key] = match above.last() {
                    Some(parent) => &parent.output,
                    None => seeds.as_slice(),
                };
                level.advance(input, generator, spacemap);
            } else {
                level.output.clear();
            }
            let produced = level.output.len();
            if let Some(next) = rest.get_mut(1) {
                next.reset(produced);
            }
        }

        Some(&levels[depth - 1].output)
    }

    /// Grow every seed in the buffer, feeding each emission to `emit`.
    /// Returns the total emitted.
    pub fn drain(&mut self, mut emit: impl FnMut(&[Key])) -> u64 {
        let mut total = 0u64;
        while let Some(out) = self.process_chunk() {
            total += out.len() as u64;
            emit(out);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_from_base(target: usize) -> u64 {
        let mut chain = LevelChain::new(2, target);
        chain.load(&[Key::base()]);
        chain.drain(|_| {})
    }

    #[test]
    fn single_level_chain() {
        let mut chain = LevelChain::new(2, 3);
        chain.load(&[Key::base()]);
        let mut got = Vec::new();
        let total = chain.drain(|keys| got.extend_from_slice(keys));
        assert_eq!(total, 2);
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|k| k.len() == 3));
    }

    #[test]
    fn known_counts_through_chain() {
        assert_eq!(count_from_base(3), 2);
        assert_eq!(count_from_base(4), 8);
        assert_eq!(count_from_base(5), 29);
        assert_eq!(count_from_base(6), 166);
    }

    #[test]
    fn empty_seed_batch_finishes_immediately() {
        let mut chain = LevelChain::new(2, 5);
        chain.load(&[]);
        assert!(chain.process_chunk().is_none());
    }

    #[test]
    fn chain_restarts_cleanly() {
        let mut chain = LevelChain::new(2, 5);
        chain.load(&[Key::base()]);
        let first = chain.drain(|_| {});
        chain.load(&[Key::base()]);
        let second = chain.drain(|_| {});
        assert_eq!(first, second);
        assert_eq!(chain.output_length(), 5);
    }

    #[test]
    fn level_dedup_keeps_one_copy() {
        let mut level = GenerationLevel::new(3);
        level.reset(1);
        let mut gen = Generator::new();
        let mut map = Spacemap::new();
        level.advance(&[Key::base()], &mut gen, &mut map);
        assert_eq!(level.output().len(), 2);
        assert!(level.is_exhausted());
        assert!(map.is_clear());
    }
}
