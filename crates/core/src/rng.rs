//! RNG module - uniform random piece generation
//!
//! Each piece kind is drawn independently and uniformly from the seven
//! tetrominoes (no bag). The generator is a small LCG so games are reproducible
//! from a seed.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::pieces::Piece;
use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Produces randomly-typed pieces at their spawn anchor
#[derive(Debug, Clone)]
pub struct PieceFactory {
    rng: SimpleRng,
}

impl PieceFactory {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Seed from the wall clock
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    /// Pick a kind uniformly among the seven tetrominoes
    pub fn next_kind(&mut self) -> PieceKind {
        let idx = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[idx]
    }

    /// Create a piece of a random kind, centered at row 0
    pub fn create_piece(&mut self) -> Piece {
        Piece::new(self.next_kind())
    }

    /// Current RNG state (for reproducing a sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceFactory {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Seed derived from the current time
pub fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_remapped() {
        assert_eq!(SimpleRng::new(0).state(), 1);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..1000 {
            assert!(rng.next_range(7) < 7);
        }
    }

    #[test]
    fn test_factory_same_seed_same_sequence() {
        let mut a = PieceFactory::new(42);
        let mut b = PieceFactory::new(42);
        for _ in 0..50 {
            assert_eq!(a.next_kind(), b.next_kind());
        }
    }

    #[test]
    fn test_factory_produces_every_kind() {
        let mut factory = PieceFactory::new(7);
        let mut seen = [false; 7];
        for _ in 0..500 {
            let kind = factory.next_kind();
            let idx = PieceKind::ALL.iter().position(|k| *k == kind).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s), "seen: {:?}", seen);
    }

    #[test]
    fn test_created_piece_uses_kind_color() {
        let mut factory = PieceFactory::new(3);
        let piece = factory.create_piece();
        assert_eq!(piece.color, piece.kind.color());
        assert_eq!(piece.y, 0);
    }
}
