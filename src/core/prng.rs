// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It is the single source of randomness in a model: initial weight draws
// and per-epoch pattern permutations both pull from the same stream, so a
// fixed seed makes whole runs reproducible bit for bit.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    pub(crate) fn from_state(state: u64) -> Self {
        let state = if state == 0 {
            0x9E3779B97F4A7C15
        } else {
            state
        };
        Self { state }
    }

    pub(crate) fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        // Marsaglia / Vigna family. Simple, fast, decent for simulation noise.
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform draw in [0, 1) with 53 bits of precision.
    #[inline]
    pub fn next_f64_01(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64;
        let v = self.next_u64() % span;
        low + v as usize
    }

    /// Fisher-Yates shuffle, used for permuted pattern order.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_range_usize(0, i + 1);
            items.swap(i, j);
        }
    }
}
