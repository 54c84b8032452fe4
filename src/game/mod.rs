//! Round resolution and opponent hand selection.
//!
//! - **determine_result**: pure comparison of two hands
//! - **HandPicker**: source of computer hands (random or scripted)
//! - **session**: the per-process game session

pub mod session;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::models::{GameResult, Hand};

pub use session::{
    GameSession, PlayOutcome, SessionError, SessionPhase, SessionRanges, SessionSnapshot,
};

/// Result of `player` against `opponent`, from the player's side.
pub fn determine_result(player: Hand, opponent: Hand) -> GameResult {
    if player == opponent {
        GameResult::Draw
    } else if player.beats() == opponent {
        GameResult::Win
    } else {
        GameResult::Lose
    }
}

/// Chooses the computer's hand for each round.
pub trait HandPicker: Send + Sync {
    fn pick(&mut self) -> Hand;
}

/// Uniform random choice over the three hands.
pub struct RandomPicker {
    rng: SmallRng,
}

impl RandomPicker {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl HandPicker for RandomPicker {
    fn pick(&mut self) -> Hand {
        Hand::ALL[self.rng.random_range(0..Hand::ALL.len())]
    }
}

/// Cycles through a fixed list of hands.
pub struct ScriptedPicker {
    hands: Vec<Hand>,
    next: usize,
}

impl ScriptedPicker {
    /// Returns `None` for an empty script.
    pub fn new(hands: Vec<Hand>) -> Option<Self> {
        if hands.is_empty() {
            return None;
        }
        Some(Self { hands, next: 0 })
    }

    /// Always picks `hand`.
    pub fn always(hand: Hand) -> Self {
        Self {
            hands: vec![hand],
            next: 0,
        }
    }
}

impl HandPicker for ScriptedPicker {
    fn pick(&mut self) -> Hand {
        let hand = self.hands[self.next];
        self.next = (self.next + 1) % self.hands.len();
        hand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_hands_draw() {
        for hand in Hand::ALL {
            assert_eq!(determine_result(hand, hand), GameResult::Draw);
        }
    }

    #[test]
    fn test_cyclic_dominance() {
        assert_eq!(determine_result(Hand::Rock, Hand::Scissors), GameResult::Win);
        assert_eq!(determine_result(Hand::Scissors, Hand::Rock), GameResult::Lose);
        assert_eq!(determine_result(Hand::Paper, Hand::Rock), GameResult::Win);
        assert_eq!(determine_result(Hand::Scissors, Hand::Paper), GameResult::Win);
        assert_eq!(determine_result(Hand::Rock, Hand::Paper), GameResult::Lose);
        assert_eq!(determine_result(Hand::Paper, Hand::Scissors), GameResult::Lose);
    }

    #[test]
    fn test_win_reversed_is_lose() {
        for a in Hand::ALL {
            for b in Hand::ALL {
                if determine_result(a, b) == GameResult::Win {
                    assert_eq!(determine_result(b, a), GameResult::Lose);
                }
            }
        }
    }

    #[test]
    fn test_each_hand_wins_exactly_once() {
        for a in Hand::ALL {
            let wins = Hand::ALL
                .iter()
                .filter(|&&b| determine_result(a, b) == GameResult::Win)
                .count();
            assert_eq!(wins, 1);
        }
    }

    #[test]
    fn test_scripted_picker_cycles() {
        let mut picker = ScriptedPicker::new(vec![Hand::Rock, Hand::Paper]).unwrap();
        assert_eq!(picker.pick(), Hand::Rock);
        assert_eq!(picker.pick(), Hand::Paper);
        assert_eq!(picker.pick(), Hand::Rock);
    }

    #[test]
    fn test_scripted_picker_rejects_empty() {
        assert!(ScriptedPicker::new(Vec::new()).is_none());
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let mut a = RandomPicker::seeded(7);
        let mut b = RandomPicker::seeded(7);
        let first: Vec<Hand> = (0..20).map(|_| a.pick()).collect();
        let second: Vec<Hand> = (0..20).map(|_| b.pick()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_picker_covers_all_hands() {
        let mut picker = RandomPicker::seeded(42);
        let picks: Vec<Hand> = (0..300).map(|_| picker.pick()).collect();
        for hand in Hand::ALL {
            assert!(picks.contains(&hand), "{} never picked", hand);
        }
    }
}
