//! Injected randomness for resolution rolls
//!
//! Every resolution path draws dice through this capability so scenario
//! tests can script exact sequences.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// A source of six-sided dice
pub trait Dice {
    /// Roll a single d6 (1..=6)
    fn d6(&mut self) -> i32;

    /// Roll 2d6 and sum
    fn roll_2d6(&mut self) -> i32 {
        self.d6() + self.d6()
    }
}

/// Seeded dice for deterministic play and replays
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn d6(&mut self) -> i32 {
        self.rng.gen_range(1..=6)
    }
}

/// Scripted dice for scenario tests
///
/// Returns the queued d6 values in order, then the fallback value forever.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    queue: VecDeque<i32>,
    fallback: i32,
}

impl ScriptedDice {
    pub fn new(rolls: &[i32]) -> Self {
        Self {
            queue: rolls.iter().copied().collect(),
            fallback: 3,
        }
    }

    pub fn with_fallback(rolls: &[i32], fallback: i32) -> Self {
        Self {
            queue: rolls.iter().copied().collect(),
            fallback,
        }
    }
}

impl Dice for ScriptedDice {
    fn d6(&mut self) -> i32 {
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_in_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..100 {
            let roll = dice.d6();
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_seeded_dice_deterministic() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let rolls_a: Vec<i32> = (0..10).map(|_| a.d6()).collect();
        let rolls_b: Vec<i32> = (0..10).map(|_| b.d6()).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_scripted_sequence_then_fallback() {
        let mut dice = ScriptedDice::new(&[6, 1]);
        assert_eq!(dice.d6(), 6);
        assert_eq!(dice.d6(), 1);
        assert_eq!(dice.d6(), 3);
    }

    #[test]
    fn test_scripted_2d6() {
        let mut dice = ScriptedDice::new(&[4, 5]);
        assert_eq!(dice.roll_2d6(), 9);
    }
}
