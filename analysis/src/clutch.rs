//! Clutch detection.
//!
//! A clutch starts when a kill leaves the victim's side with a single
//! survivor. The survivor is charged an attempt for the number of opponents
//! still alive (the tier). Should the other side later also be reduced to a
//! single player, that survivor is charged a 1v1 attempt. Wins are credited at
//! round end to whichever of the two belongs to the winning side.

use common::events::{PlayerId, PlayerRef, Side};

use crate::round::RoundStats;

/// Number of opponents a clutch was started against, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClutchTier(u8);

impl ClutchTier {
    pub const ONE: Self = Self(1);

    pub fn new(enemies: u32) -> Option<Self> {
        match enemies {
            1..=5 => Some(Self(enemies as u8)),
            _ => None,
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    fn index(&self) -> usize {
        self.0 as usize - 1
    }
}

/// Attempts and wins per tier, index 0 being the 1v1.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClutchRecord {
    pub attempts: [u32; 5],
    pub wins: [u32; 5],
}

impl ClutchRecord {
    pub fn attempt(&mut self, tier: ClutchTier) {
        self.attempts[tier.index()] += 1;
    }

    pub fn win(&mut self, tier: ClutchTier) {
        self.wins[tier.index()] += 1;
    }

    pub fn attempts(&self, tier: ClutchTier) -> u32 {
        self.attempts[tier.index()]
    }

    pub fn wins(&self, tier: ClutchTier) -> u32 {
        self.wins[tier.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clutch {
    pub player: PlayerId,
    pub side: Side,
    pub tier: ClutchTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClutchEvent {
    Clutch { player: PlayerId, tier: ClutchTier },
    OneVsOne { player: PlayerId },
}

impl ClutchEvent {
    pub fn player(&self) -> PlayerId {
        match self {
            Self::Clutch { player, .. } | Self::OneVsOne { player } => *player,
        }
    }

    pub fn tier(&self) -> ClutchTier {
        match self {
            Self::Clutch { tier, .. } => *tier,
            Self::OneVsOne { .. } => ClutchTier::ONE,
        }
    }
}

/// Evaluates the victim's side after `side_alive` was left on it. Only the
/// victim's side is looked at, so the order kills arrive in decides who is
/// the clutching player when both sides drop to one.
pub fn on_kill(round: &mut RoundStats, victim: &PlayerRef, side_alive: u32) -> Option<ClutchEvent> {
    if side_alive != 1 || !round.is_open() {
        return None;
    }

    let survivor = match round.survivor(victim.side, victim.id) {
        Some(s) => s.clone(),
        None => {
            tracing::warn!(side = ?victim.side, "One alive but no survivor in the lineup");
            return None;
        }
    };

    let current = round.clutch;
    match current {
        None => {
            let enemies = victim.side.opponent().map(|s| round.alive(s)).unwrap_or(0);
            let tier = match ClutchTier::new(enemies) {
                Some(t) => t,
                None => {
                    tracing::debug!(enemies, "No clutch against this many enemies");
                    return None;
                }
            };

            tracing::debug!(player = survivor.player, tier = tier.get(), "Clutch started");
            round.clutch = Some(Clutch {
                player: survivor.player,
                side: survivor.side,
                tier,
            });

            Some(ClutchEvent::Clutch {
                player: survivor.player,
                tier,
            })
        }
        Some(clutch) if clutch.side != survivor.side && round.clutch_1v1.is_none() => {
            tracing::debug!(player = survivor.player, against = clutch.player, "1v1 started");
            let player = survivor.player;
            round.clutch_1v1 = Some(survivor);

            Some(ClutchEvent::OneVsOne { player })
        }
        Some(_) => None,
    }
}

/// Clutches won by players of the `winner` side.
pub fn winners(round: &RoundStats, winner: Side) -> Vec<(PlayerId, ClutchTier)> {
    let clutch = round
        .clutch
        .filter(|c| c.side == winner)
        .map(|c| (c.player, c.tier));
    let one_vs_one = round
        .clutch_1v1
        .as_ref()
        .filter(|l| l.side == winner)
        .map(|l| (l.player, ClutchTier::ONE));

    clutch.into_iter().chain(one_vs_one).collect()
}
