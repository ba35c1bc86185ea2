//! Injected randomness for hello randoms, session ids and GREASE picks.

use hforge_types::{CodecError, CodecResult};

/// A source of random bytes.
pub trait RandomSource {
    /// Fill `buf` entirely with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> CodecResult<()>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        getrandom::getrandom(buf).map_err(|e| CodecError::RandomSource(e.to_string()))
    }
}

/// Deterministic source that cycles through a fixed byte pattern.
///
/// For tests and replaying captured hellos; never for live traffic.
#[derive(Debug, Clone)]
pub struct FixedRandom {
    pattern: Vec<u8>,
    pos: usize,
}

impl FixedRandom {
    /// An empty pattern yields zero bytes.
    pub fn new(pattern: impl Into<Vec<u8>>) -> Self {
        Self {
            pattern: pattern.into(),
            pos: 0,
        }
    }
}

impl RandomSource for FixedRandom {
    fn fill(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        if self.pattern.is_empty() {
            buf.fill(0);
            return Ok(());
        }
        for b in buf.iter_mut() {
            *b = self.pattern[self.pos];
            self.pos = (self.pos + 1) % self.pattern.len();
        }
        Ok(())
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn fill(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        (**self).fill(buf)
    }
}

/// Draw a fresh 32-byte hello random.
pub fn random_32(rng: &mut dyn RandomSource) -> CodecResult<[u8; 32]> {
    let mut out = [0u8; 32];
    rng.fill(&mut out)?;
    Ok(out)
}
