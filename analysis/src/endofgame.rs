use std::collections::HashSet;

use common::events::{DecoderError, Event, GrenadeKind, PlayerId, PlayerRef, PlayerState, Side, Weapon};

use crate::classify::{self, Equipment, FlashTier, KillFacts, Relation};
use crate::clutch::{self, ClutchEvent};
use crate::perround::{Round, RoundLog};
use crate::residual::{self, HitOutcome};
use crate::round::RoundStats;
use crate::scoreboard::{BoxScore, KnifeRoundStats, Scoreboard};
use crate::Error;

#[derive(Debug, Clone)]
pub struct Config {
    /// Ticks per second of the event clock.
    pub tick_rate: f32,
    pub trade_window_secs: f32,
    /// Flashes lasting longer than this are full flashes.
    pub full_flash_secs: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: 64.0,
            trade_window_secs: 5.0,
            full_flash_secs: 1.1,
        }
    }
}

impl Config {
    pub fn trade_window_ticks(&self) -> u32 {
        (self.tick_rate * self.trade_window_secs).max(0.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Complete,
    /// The decoder stopped before the match was over.
    Truncated,
}

/// Builds the box score of one match from its events, in order.
#[derive(Debug)]
pub struct Aggregator {
    config: Config,
    scoreboard: Option<Scoreboard>,
    round: Option<RoundStats>,
    knife_round: Option<Vec<KnifeRoundStats>>,
    match_started: bool,
    /// Flash grenades already counted this round, by thrower and entity.
    counted_flashes: HashSet<(PlayerId, i32)>,
    map_name: String,
    log: RoundLog,
}

impl Aggregator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scoreboard: None,
            round: None,
            knife_round: None,
            match_started: false,
            counted_flashes: HashSet::new(),
            map_name: String::new(),
            log: RoundLog::default(),
        }
    }

    pub fn scoreboard(&self) -> Option<&Scoreboard> {
        self.scoreboard.as_ref()
    }

    pub fn round(&self) -> Option<&RoundStats> {
        self.round.as_ref()
    }

    /// Rounds finished so far.
    pub fn rounds(&self) -> &[Round] {
        self.log.rounds()
    }

    pub fn rounds_played(&self) -> u32 {
        self.scoreboard.as_ref().map(|s| s.rounds_played).unwrap_or(0)
    }

    pub fn handle(&mut self, event: &Event) -> Result<(), Error> {
        let _tracing_guard = tracing::trace_span!("Event", kind = event.kind()).entered();

        match event {
            Event::MatchStart {
                max_rounds,
                participants,
            } => {
                return self.match_start(max_rounds.as_deref(), participants);
            }
            Event::Metadata { map_name } => {
                self.map_name = map_name.clone();
            }
            Event::RoundStart { participants } => {
                self.round_start(participants);
            }
            Event::RoundEnd {
                winner,
                reason,
                rounds_played,
                players,
            } => {
                self.round_end(*winner, *reason, *rounds_played, players);
            }
            Event::Kill {
                tick,
                killer,
                victim,
                assister,
                weapon,
                through_smoke,
                penetrated_objects,
                headshot,
                no_scope,
                attacker_blind,
                assisted_flash,
            } => {
                let facts = KillFacts {
                    killer: killer.as_ref(),
                    victim,
                    through_smoke: *through_smoke,
                    penetrated_objects: *penetrated_objects,
                    headshot: *headshot,
                    no_scope: *no_scope,
                    attacker_blind: *attacker_blind,
                    assisted_flash: *assisted_flash,
                };
                self.player_death(*tick, &facts, assister.as_ref(), weapon);
            }
            Event::OtherDeath { killer, other_type } => {
                if let Some(scoreboard) = self.scoreboard.as_mut() {
                    if other_type == "chicken" {
                        if let Some(killer) = scoreboard.player(killer.as_ref()) {
                            killer.chicken_kills += 1;
                        }
                    }
                }
            }
            Event::Grenade {
                kind,
                thrower,
                entity_id,
            } => {
                self.grenade(*kind, thrower.as_ref(), *entity_id);
            }
            Event::InfernoStart { thrower } => {
                if let Some(thrower) = self.scoreboard.as_mut().and_then(|s| s.player(thrower.as_ref())) {
                    tracing::trace!(thrower = %thrower.nickname, "Fire grenade");
                    thrower.utility.burns += 1;
                }
            }
            Event::WeaponFire { shooter } => {
                if let Some(shooter) = self.scoreboard.as_mut().and_then(|s| s.player(shooter.as_ref())) {
                    shooter.shots_fired += 1;
                }
            }
            Event::WeaponReload { player } => {
                if let Some(player) = self.scoreboard.as_mut().and_then(|s| s.player(player.as_ref())) {
                    player.reloads += 1;
                }
            }
            Event::PlayerFlashed {
                attacker,
                player,
                duration,
            } => {
                self.player_flashed(attacker.as_ref(), player.as_ref(), *duration);
            }
            Event::PlayerHurt {
                attacker,
                player,
                weapon,
                damage_taken,
                health,
            } => {
                self.player_hurt(attacker.as_ref(), player, weapon, *damage_taken, *health);
            }
        };

        Ok(())
    }

    fn match_start(&mut self, max_rounds: Option<&str>, participants: &[PlayerRef]) -> Result<(), Error> {
        let max_rounds = match parse_max_rounds(max_rounds) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("{}", e);
                return Err(e);
            }
        };

        if self.knife_round.is_none() {
            if let Some(snapshot) = self.scoreboard.as_ref().and_then(|s| s.knife_round_snapshot()) {
                tracing::debug!(players = snapshot.len(), "Keeping knife round stats");
                self.knife_round = Some(snapshot);
            }
        }

        if !self.match_started && self.scoreboard.is_some() {
            tracing::warn!("Scoreboard was initialized before match start. Stats might be off.");
        }

        let mut scoreboard = Scoreboard::new(participants);
        scoreboard.max_rounds = Some(max_rounds);
        if let Some(snapshot) = self.knife_round.as_ref() {
            scoreboard.apply_knife_round(snapshot);
        }

        self.scoreboard = Some(scoreboard);
        self.round = None;
        self.counted_flashes.clear();
        self.log.clear();
        self.match_started = true;

        tracing::debug!(max_rounds, "Match start");

        Ok(())
    }

    fn round_start(&mut self, participants: &[PlayerRef]) {
        let scoreboard = self.scoreboard.get_or_insert_with(|| {
            tracing::warn!("No match start before the first round. Initializing scoreboard.");
            Scoreboard::new(participants)
        });

        self.round = Some(scoreboard.start_round(participants));
        self.counted_flashes.clear();

        tracing::debug!(round = scoreboard.rounds_played + 1, "Round start");
    }

    fn round_end(&mut self, winner: Side, reason: i32, rounds_played: u32, players: &[PlayerState]) {
        let scoreboard = match self.scoreboard.as_mut() {
            Some(s) => s,
            None => {
                tracing::trace!("Round end before the scoreboard exists");
                return;
            }
        };

        let already_ended = self.round.as_ref().map(|r| r.ended).unwrap_or(false);
        scoreboard.end_round(self.round.as_mut(), winner, rounds_played, players);
        if !already_ended {
            self.log.finish(rounds_played, winner, reason);
        }

        tracing::debug!(round = rounds_played, ?winner, "Round end");
    }

    fn player_death(&mut self, tick: u32, facts: &KillFacts<'_>, assister: Option<&PlayerRef>, weapon: &Weapon) {
        let scoreboard = match self.scoreboard.as_mut() {
            Some(s) => s,
            None => return,
        };

        tracing::trace!(
            killer = ?facts.killer.map(|k| &k.name),
            victim = %facts.victim.name,
            weapon = %weapon.name,
            "Kill"
        );

        let kill_type = classify::kill_type(facts);
        let relation = classify::relation(facts.killer, Some(facts.victim));
        let world = Equipment::from_code(weapon.code) == Equipment::World;
        let mut round = self.round.as_mut().filter(|r| r.is_open());

        if let Some(round) = round.as_deref_mut() {
            self.log.kill(tick, facts.killer.map(|k| k.id), facts.victim.id, kill_type);

            if let Some(side_alive) = round.on_kill(facts.victim) {
                if let Some(event) = clutch::on_kill(round, facts.victim, side_alive) {
                    if let Some(clutcher) = scoreboard.players.get_mut(event.player()) {
                        clutcher.clutches.attempt(event.tier());
                    }
                    if let ClutchEvent::Clutch { .. } = event {
                        self.log.clutch(&event);
                    }
                }
            }
        }

        if let Some(killer) = scoreboard.player(facts.killer) {
            killer.kills += 1;
            *killer.kills_by_weapon.entry(weapon.name.clone()).or_default() += 1;
            *killer.kills_by_type.entry(kill_type).or_default() += 1;
            if relation == Relation::Teammate {
                killer.team_kills += 1;
            }
        }

        if let Some(victim) = scoreboard.get_or_create(facts.victim) {
            victim.deaths += 1;
            *victim.deaths_by_weapon.entry(weapon.name.clone()).or_default() += 1;
            *victim.deaths_by_type.entry(kill_type).or_default() += 1;
            if world {
                victim.suicides += 1;
            }
        }

        if world {
            return;
        }

        match relation {
            Relation::Enemy => {
                if let (Some(killer), Some(round)) = (facts.killer, round.as_deref_mut()) {
                    let window = self.config.trade_window_ticks();
                    let traded = round.record_enemy_kill(tick, killer.id, facts.victim.id, window);

                    let entry = !round.first_blood;
                    round.first_blood = true;

                    if let Some(score) = scoreboard.get_or_create(killer) {
                        score.trade_kills += traded.len() as u32;
                        if entry {
                            score.entry_count += 1;
                            score.entry_wins += 1;
                        }
                    }
                    if entry {
                        if let Some(score) = scoreboard.get_or_create(facts.victim) {
                            score.entry_count += 1;
                        }
                    }
                    for player in traded {
                        if let Some(score) = scoreboard.players.get_mut(player) {
                            score.traded_deaths += 1;
                        }
                    }
                }

                if let Some(killer) = scoreboard.player(facts.killer) {
                    killer.special_kills.record(facts);
                }
                if let Some(victim) = scoreboard.get_or_create(facts.victim) {
                    victim.special_deaths.record(facts);
                }
                if facts.assisted_flash {
                    if let Some(assister) = scoreboard.player(assister) {
                        assister.flash_assists += 1;
                    }
                }
            }
            Relation::Teammate | Relation::Own => {
                if let Some(killer) = scoreboard.player(facts.killer) {
                    killer.team_special_kills.record(facts);
                }
                if let Some(victim) = scoreboard.get_or_create(facts.victim) {
                    victim.team_special_deaths.record(facts);
                }
                if facts.assisted_flash {
                    if let Some(assister) = scoreboard.player(assister) {
                        assister.team_flash_assists += 1;
                    }
                }
            }
        }

        if let Some(assister) = assister.filter(|a| a.side != facts.victim.side) {
            if let Some(round) = round.as_deref_mut() {
                round.kast.insert(assister.id);
            }
            if let Some(score) = scoreboard.get_or_create(assister) {
                score.assists += 1;
            }
        }
    }

    fn player_hurt(
        &mut self,
        attacker: Option<&PlayerRef>,
        player: &PlayerRef,
        weapon: &Weapon,
        damage_taken: u32,
        health: u32,
    ) {
        let scoreboard = match self.scoreboard.as_mut() {
            Some(s) => s,
            None => return,
        };

        tracing::trace!(
            attacker = ?attacker.map(|a| &a.name),
            victim = %player.name,
            damage_taken,
            weapon = %weapon.name,
            "Hurt"
        );

        let equipment = Equipment::from_code(weapon.code);
        if scoreboard.knife_round && attacker.is_some() && !equipment.is_melee() && damage_taken > 0 {
            tracing::debug!("Knife round is over");
            scoreboard.knife_round = false;
        }

        let damage = match self.round.as_mut().filter(|r| r.is_open()) {
            Some(round) => match round.on_damage(player, attacker, damage_taken, health) {
                HitOutcome::Credited(d) => d,
                HitOutcome::Deferred => 0,
                HitOutcome::Unattributed => return,
            },
            None if attacker.is_none() => return,
            None => damage_taken,
        };

        let relation = classify::relation(attacker, Some(player));
        let bucket = equipment.damage_bucket();

        if let Some(attacker) = scoreboard.player(attacker) {
            match relation {
                Relation::Enemy => {
                    attacker.damage_done += damage;
                    attacker.shots_on_enemies += 1;
                    attacker.bucket_mut(bucket).dealt += damage;
                }
                Relation::Teammate | Relation::Own => {
                    attacker.team_damage_done += damage;
                    attacker.shots_on_teammates += 1;
                    attacker.bucket_mut(bucket).team_dealt += damage;
                }
            }
        }

        if let Some(receiver) = scoreboard.get_or_create(player) {
            match relation {
                Relation::Enemy => {
                    receiver.damage_received += damage;
                    receiver.bucket_mut(bucket).received += damage;
                }
                Relation::Teammate | Relation::Own => {
                    receiver.team_damage_received += damage;
                    let totals = receiver.bucket_mut(bucket);
                    totals.team_received += damage;
                    if relation == Relation::Own {
                        totals.self_inflicted += damage;
                    }
                }
            }
        }
    }

    fn player_flashed(&mut self, attacker: Option<&PlayerRef>, player: Option<&PlayerRef>, duration: f32) {
        let scoreboard = match self.scoreboard.as_mut() {
            Some(s) => s,
            None => return,
        };

        let effect = match classify::classify_flash(attacker, player, duration, self.config.full_flash_secs) {
            Some(e) => e,
            None => return,
        };

        tracing::trace!(
            attacker = ?attacker.map(|a| &a.name),
            player = ?player.map(|p| &p.name),
            duration,
            "Flashed"
        );

        let full = effect.tier == FlashTier::Full;
        if let Some(attacker) = scoreboard.player(attacker) {
            let flashes = &mut attacker.flashes;
            let counter = match (effect.relation, full) {
                (Relation::Enemy, true) => &mut flashes.enemies_full,
                (Relation::Enemy, false) => &mut flashes.enemies_half,
                (Relation::Teammate, true) => &mut flashes.teammates_full,
                (Relation::Teammate, false) => &mut flashes.teammates_half,
                (Relation::Own, true) => &mut flashes.self_full,
                (Relation::Own, false) => &mut flashes.self_half,
            };
            *counter += 1;
        }

        if effect.relation == Relation::Own {
            return;
        }

        if let Some(receiver) = scoreboard.player(player) {
            let flashes = &mut receiver.flashes;
            let counter = match (effect.relation, full) {
                (Relation::Enemy, true) => &mut flashes.full_received,
                (Relation::Enemy, false) => &mut flashes.half_received,
                (_, true) => &mut flashes.team_full_received,
                (_, false) => &mut flashes.team_half_received,
            };
            *counter += 1;
        }
    }

    fn grenade(&mut self, kind: GrenadeKind, thrower: Option<&PlayerRef>, entity_id: i32) {
        let scoreboard = match self.scoreboard.as_mut() {
            Some(s) => s,
            None => return,
        };
        let thrower = match scoreboard.player(thrower) {
            Some(t) => t,
            None => return,
        };

        tracing::trace!(thrower = %thrower.nickname, ?kind, entity_id, "Grenade");

        let utility = &mut thrower.utility;
        match kind {
            GrenadeKind::Flash => {
                // The decoder reports most flash explosions twice.
                if self.counted_flashes.insert((thrower.steam_id, entity_id)) {
                    utility.flashes += 1;
                }
            }
            GrenadeKind::HighExplosive => utility.hes += 1,
            GrenadeKind::Smoke => utility.smokes += 1,
            GrenadeKind::Decoy => utility.decoys += 1,
        }
    }

    /// A round still open here was cut off. Its deferred lethal hits are
    /// credited, everything else about it is dropped.
    pub fn finalize(mut self, end: StreamEnd) -> BoxScore {
        let mut scoreboard = self.scoreboard.unwrap_or_else(|| {
            tracing::warn!("No match was started, the box score is empty");
            Scoreboard::new(&[])
        });
        scoreboard.map_name = self.map_name;

        if let Some(round) = self.round.as_mut().filter(|r| r.is_open()) {
            let credited = residual::reconcile(round.healths.take(), &mut scoreboard.players);
            tracing::debug!(credited, "Reconciled the unfinished round");
        }

        scoreboard.finalize(end == StreamEnd::Complete, self.log.into_rounds())
    }
}

fn parse_max_rounds(value: Option<&str>) -> Result<u32, Error> {
    let value = value.ok_or(Error::MissingMaxRounds)?;

    value.trim().parse().map_err(|source| Error::InvalidMaxRounds {
        value: value.to_owned(),
        source,
    })
}

/// Runs every event of one match through an [`Aggregator`]. A decoder that
/// runs out of data early still yields the box score accumulated so far.
pub fn parse<I>(config: &Config, events: I) -> Result<BoxScore, Error>
where
    I: IntoIterator<Item = Result<Event, DecoderError>>,
{
    let mut aggregator = Aggregator::new(config.clone());

    for event in events {
        match event {
            Ok(event) => aggregator.handle(&event)?,
            Err(DecoderError::UnexpectedEnd) => {
                tracing::warn!(
                    "Demo incomplete. Only {} complete rounds, finalizing anyway.",
                    aggregator.rounds_played()
                );
                return Ok(aggregator.finalize(StreamEnd::Truncated));
            }
            Err(DecoderError::Other(e)) => {
                tracing::error!("Decoding demo: {}", e);
                return Err(Error::Decoder(e));
            }
        }
    }

    Ok(aggregator.finalize(StreamEnd::Complete))
}
