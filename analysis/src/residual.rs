//! Reconciliation of damage the decoder misattributes on lethal hits.
//!
//! When a hit takes a player to zero health while reporting more damage than
//! the player had left, the attacker of that event cannot be trusted. The hit
//! is not credited. The player's remaining health goes to the attacker of the
//! last trusted hit once the round is over. Hits without an attacker, like
//! falls, only lower the tracked health.

use common::events::PlayerRef;

use crate::registry::PlayerRegistry;
use crate::round::{Damager, RoundHealth, RoundHealths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Credit this much damage right away.
    Credited(u32),
    /// Nothing now, the remaining health is credited at round end.
    Deferred,
    /// Falls and other world damage. Nobody is credited.
    Unattributed,
}

pub fn observe_hit(
    healths: &mut RoundHealths,
    victim: &PlayerRef,
    attacker: Option<&PlayerRef>,
    damage_taken: u32,
    health: u32,
) -> HitOutcome {
    let attacker = match attacker {
        Some(a) => a,
        None => {
            healths.update_min_health(victim, health);
            return HitOutcome::Unattributed;
        }
    };

    let entry = healths.entry(victim);

    if health == 0 && damage_taken > entry.min_health {
        let damager = entry.last_attacker.unwrap_or_else(|| Damager::from(attacker));
        tracing::trace!(
            victim = %victim.name,
            damage_taken,
            remaining = entry.min_health,
            ?damager,
            "Deferring lethal hit"
        );
        entry.damager = Some(damager);
        return HitOutcome::Deferred;
    }

    entry.last_attacker = Some(Damager::from(attacker));

    healths.update_min_health(victim, health);

    HitOutcome::Credited(damage_taken)
}

/// Credits every deferred lethal hit. Returns the total amount credited.
pub fn reconcile(healths: Vec<RoundHealth>, players: &mut PlayerRegistry) -> u32 {
    let mut total = 0;

    for health in healths {
        let damager = match health.damager {
            Some(d) => d,
            None => continue,
        };
        let amount = health.min_health;
        let team_damage = damager.side == health.side;

        match players.get_mut(damager.id) {
            Some(score) if team_damage => score.team_damage_done += amount,
            Some(score) => score.damage_done += amount,
            None => {
                tracing::warn!(damager = damager.id, "Residual damage for unknown player");
                continue;
            }
        }

        if let Some(victim) = players.get_mut(health.player) {
            if team_damage {
                victim.team_damage_received += amount;
            } else {
                victim.damage_received += amount;
            }
        }

        tracing::trace!(damager = damager.id, victim = health.player, amount, "Residual damage");
        total += amount;
    }

    total
}
