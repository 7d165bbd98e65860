//! Round scoped state. Created at round start and dropped once its effects
//! are folded into the scoreboard.

use std::collections::{HashMap, HashSet};

use common::events::{PlayerId, PlayerRef, Side};

use crate::clutch::Clutch;
use crate::residual::{self, HitOutcome};

pub const START_HEALTH: u32 = 100;

/// Whoever gets credited for damage on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damager {
    pub id: PlayerId,
    pub side: Side,
}

impl From<&PlayerRef> for Damager {
    fn from(value: &PlayerRef) -> Self {
        Self {
            id: value.id,
            side: value.side,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundHealth {
    pub player: PlayerId,
    pub side: Side,
    /// Lowest health above zero seen this round.
    pub min_health: u32,
    /// Attacker of the last hit that could be trusted.
    pub last_attacker: Option<Damager>,
    /// Receives the health that was never attributed to a hit.
    pub damager: Option<Damager>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundHealths(Vec<RoundHealth>);

impl RoundHealths {
    pub fn new<I>(players: I) -> Self
    where
        I: IntoIterator<Item = (PlayerId, Side)>,
    {
        Self(
            players
                .into_iter()
                .map(|(player, side)| RoundHealth {
                    player,
                    side,
                    min_health: START_HEALTH,
                    last_attacker: None,
                    damager: None,
                })
                .collect(),
        )
    }

    pub fn get(&self, player: PlayerId) -> Option<&RoundHealth> {
        self.0.iter().find(|h| h.player == player)
    }

    pub(crate) fn entry(&mut self, player: &PlayerRef) -> &mut RoundHealth {
        match self.0.iter().position(|h| h.player == player.id) {
            Some(i) => &mut self.0[i],
            None => {
                tracing::trace!(player = %player.name, "No health baseline, starting at full health");
                self.0.push(RoundHealth {
                    player: player.id,
                    side: player.side,
                    min_health: START_HEALTH,
                    last_attacker: None,
                    damager: None,
                });
                let last = self.0.len() - 1;
                &mut self.0[last]
            }
        }
    }

    pub fn update_min_health(&mut self, player: &PlayerRef, health: u32) {
        let entry = self.entry(player);
        if health > 0 && health < entry.min_health {
            entry.min_health = health;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundHealth> {
        self.0.iter()
    }

    pub fn take(&mut self) -> Vec<RoundHealth> {
        std::mem::take(&mut self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillTime {
    pub tick: u32,
    pub killer: PlayerId,
    pub victim: PlayerId,
    pub traded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    pub player: PlayerId,
    pub side: Side,
    pub alive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RoundStats {
    pub kills_on_round: HashMap<PlayerId, u32>,
    pub t_alive: u32,
    pub ct_alive: u32,
    pub lineup: Vec<Lineup>,
    pub ended: bool,
    pub first_blood: bool,
    pub clutch: Option<Clutch>,
    pub clutch_1v1: Option<Lineup>,
    pub healths: RoundHealths,
    pub kill_times: Vec<KillTime>,
    /// Players that got a kill, an assist or were traded this round.
    pub kast: HashSet<PlayerId>,
}

impl RoundStats {
    /// `participants` are the players on the server at round start, `known`
    /// everyone with a score entry.
    pub fn new<I>(participants: &[PlayerRef], known: I) -> Self
    where
        I: IntoIterator<Item = (PlayerId, Side)>,
    {
        let lineup: Vec<Lineup> = participants
            .iter()
            .filter(|p| p.side.is_playing() && !p.is_sentinel())
            .map(|p| Lineup {
                player: p.id,
                side: p.side,
                alive: p.alive,
            })
            .collect();

        let alive_on = |side: Side| -> u32 {
            lineup
                .iter()
                .filter(|l| l.side == side && l.alive)
                .count() as u32
        };

        Self {
            t_alive: alive_on(Side::Terrorists),
            ct_alive: alive_on(Side::CounterTerrorists),
            healths: RoundHealths::new(known),
            lineup,
            ..Default::default()
        }
    }

    pub fn is_open(&self) -> bool {
        !self.ended
    }

    pub fn alive(&self, side: Side) -> u32 {
        match side {
            Side::Terrorists => self.t_alive,
            Side::CounterTerrorists => self.ct_alive,
            _ => 0,
        }
    }

    /// Tracks the victim's health and decides how much of the hit to credit.
    pub fn on_damage(
        &mut self,
        victim: &PlayerRef,
        attacker: Option<&PlayerRef>,
        damage_taken: u32,
        health: u32,
    ) -> HitOutcome {
        residual::observe_hit(&mut self.healths, victim, attacker, damage_taken, health)
    }

    /// Takes the victim out of the round. Returns how many are left alive on
    /// their side, `None` once the round is over, for non playing sides and
    /// for victims already dead.
    pub fn on_kill(&mut self, victim: &PlayerRef) -> Option<u32> {
        if self.ended {
            tracing::trace!(victim = %victim.name, "Kill after round end");
            return None;
        }

        if let Some(entry) = self.lineup.iter_mut().find(|l| l.player == victim.id) {
            if !entry.alive {
                tracing::warn!(victim = %victim.name, "Kill of a player that is already dead, duplicate event");
                return None;
            }
            entry.alive = false;
        }

        let counter = match victim.side {
            Side::Terrorists => &mut self.t_alive,
            Side::CounterTerrorists => &mut self.ct_alive,
            _ => return None,
        };

        match counter.checked_sub(1) {
            Some(left) => *counter = left,
            None => {
                tracing::warn!(victim = %victim.name, side = ?victim.side, "Alive count would go negative, out of order or duplicate kill");
            }
        }

        Some(*counter)
    }

    pub fn end(&mut self) {
        self.ended = true;
    }

    /// First living player of `side` other than `excluding`.
    pub fn survivor(&self, side: Side, excluding: PlayerId) -> Option<&Lineup> {
        self.lineup
            .iter()
            .find(|l| l.side == side && l.alive && l.player != excluding)
    }

    pub fn survived(&self, player: PlayerId) -> bool {
        self.lineup.iter().any(|l| l.player == player && l.alive)
    }

    pub fn kills_of(&self, player: PlayerId) -> u32 {
        self.kills_on_round.get(&player).copied().unwrap_or(0)
    }

    /// Records a kill on an enemy and returns the players whose death it
    /// avenged within `window` ticks.
    pub fn record_enemy_kill(
        &mut self,
        tick: u32,
        killer: PlayerId,
        victim: PlayerId,
        window: u32,
    ) -> Vec<PlayerId> {
        *self.kills_on_round.entry(killer).or_default() += 1;
        self.kast.insert(killer);

        let traded: Vec<PlayerId> = self
            .kill_times
            .iter_mut()
            .filter(|k| k.killer == victim && !k.traded && tick.saturating_sub(k.tick) <= window)
            .map(|k| {
                k.traded = true;
                k.victim
            })
            .collect();
        self.kast.extend(traded.iter().copied());

        self.kill_times.push(KillTime {
            tick,
            killer,
            victim,
            traded: false,
        });

        traded
    }

    pub fn kast_credit(&self, player: PlayerId) -> bool {
        self.kast.contains(&player) || self.survived(player)
    }
}
