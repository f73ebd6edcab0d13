//! Deterministic, seed-addressable noise used by time-varying effects.

#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// Value in `[0, 1)` addressed by `(seed, x)`. Same inputs, same output.
pub fn noise01(seed: u64, x: u64) -> f64 {
    let mut rng = Rng64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01()
}

/// Scalar noise in `[0, 1)` for a signed integer seed.
///
/// Effects derive seeds as `floor(time / period) + k * stride`, so nearby seeds must
/// decorrelate; the SplitMix finalizer takes care of that.
pub fn pseudo_random(seed: i64) -> f64 {
    noise01(0x6D6F_7368_7069_7421, seed as u64)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/random.rs"]
mod tests;
