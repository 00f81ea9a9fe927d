//! Fast PRNG for enhancement trials. Uses SplitMix64 for throughput and good statistical quality.
//! Deterministic: same seed produces the same sequence. Not cryptographically secure.
//!
//! Each trial gets its own stream via [stream_seed], so batches can be split across threads
//! without sharing a generator.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// 2^-53, the spacing of the f64 values produced by [Rng::next_f64].
const UNIT_F64_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
    z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
    z ^ (z >> 31)
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generator for trial `index` of a batch seeded with `seed`.
    pub fn for_trial(seed: u64, index: u64) -> Self {
        Self::new(stream_seed(seed, index))
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        mix(self.state)
    }

    /// Uniform sample in `[0, 1)` built from the top 53 bits.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * UNIT_F64_SCALE
    }
}

/// Seed of the independent stream for trial `index`.
pub fn stream_seed(seed: u64, index: u64) -> u64 {
    mix(seed ^ mix(index.wrapping_add(1).wrapping_mul(SPLITMIX64_GOLDEN)))
}

/// Fresh seed from OS entropy, for runs that do not ask for one.
pub fn entropy_seed() -> Result<u64, getrandom::Error> {
    let mut buf = [0u8; 8];
    getrandom::fill(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
