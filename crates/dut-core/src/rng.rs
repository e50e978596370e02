//! splitmix64: the deterministic 64-bit stream backing every scheduling
//! decision in a run.
//!
//! This is deliberately not `rand`'s `SmallRng` or any other library
//! generator — the trace format is a wire contract, and two
//! implementations of this spec on two different platforms must derive
//! byte-identical traces from the same `schedule_seed`. splitmix64 is
//! simple enough to freeze exactly, down to the wrapping arithmetic and
//! the `% max` bias in [`Splitmix64::range`].

/// A splitmix64 generator, seeded once and advanced once per call.
#[derive(Debug, Clone)]
pub struct Splitmix64 {
    state: u64,
}

impl Splitmix64 {
    /// Creates a generator seeded with `seed`. Distinct seeds produce
    /// distinct streams; the same seed always produces the same stream.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Returns `next_u64() % max`, biased by design — reproducibility
    /// across implementations matters more than uniformity here.
    ///
    /// `max == 0` returns `0` rather than dividing by zero; callers
    /// never legitimately ask for a range of zero candidates, but this
    /// keeps the method total instead of panicking.
    pub fn range(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        self.next_u64() % max
    }

    /// Returns the low bit of the next 64-bit value.
    pub fn next_bit(&mut self) -> u64 {
        self.next_u64() & 1
    }
}
