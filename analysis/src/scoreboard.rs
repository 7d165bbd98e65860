use std::collections::{BTreeMap, BTreeSet};

use common::events::{PlayerId, PlayerRef, PlayerState, Side};

use crate::classify;
use crate::clutch;
use crate::perround::Round;
use crate::registry::{PlayerRegistry, PlayerScore};
use crate::residual;
use crate::round::RoundStats;

/// Players a team is expected to have at most.
const TEAM_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnifeRoundStats {
    pub steam_id: PlayerId,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
}

/// Match level aggregate, created at match start.
#[derive(Debug)]
pub struct Scoreboard {
    pub players: PlayerRegistry,
    pub team_members: BTreeMap<i32, BTreeSet<PlayerId>>,
    pub team_names: BTreeMap<i32, String>,
    pub rounds_played: u32,
    pub max_rounds: Option<u32>,
    pub map_name: String,
    /// Still in the knife round preceding the real match.
    pub knife_round: bool,
    pub teams_swapped: bool,
}

/// The finished box score of a match.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoxScore {
    pub player_scores: Vec<PlayerScore>,
    pub rounds_played: u32,
    pub max_rounds: Option<u32>,
    pub map_name: String,
    pub team_names: BTreeMap<i32, String>,
    pub team_members: BTreeMap<i32, BTreeSet<PlayerId>>,
    pub winner_team_id: Option<i32>,
    pub winner_team: Option<String>,
    pub kd_type_bits: BTreeMap<u8, String>,
    pub rounds: Vec<Round>,
    /// False when the demo ended before the match did.
    pub complete: bool,
}

pub fn average_damage(damage: u32, rounds: u32) -> f64 {
    if rounds == 0 {
        return 0.0;
    }

    damage as f64 / rounds as f64
}

pub fn kast_percentage(kast_rounds: u32, rounds: u32) -> f64 {
    if rounds == 0 {
        return 0.0;
    }

    (kast_rounds.min(rounds) as f64 / rounds as f64) * 100.0
}

impl Scoreboard {
    pub fn new(participants: &[PlayerRef]) -> Self {
        let mut scoreboard = Self {
            players: PlayerRegistry::new(),
            team_members: BTreeMap::new(),
            team_names: BTreeMap::new(),
            rounds_played: 0,
            max_rounds: None,
            map_name: String::new(),
            knife_round: true,
            teams_swapped: false,
        };

        for player in participants.iter().filter(|p| p.side.is_playing()) {
            scoreboard.lookup(player, false);
        }

        scoreboard
    }

    /// Score entry of `player`, created on first sight. `None` for the
    /// unknown player sentinel.
    pub fn get_or_create(&mut self, player: &PlayerRef) -> Option<&mut PlayerScore> {
        self.lookup(player, true)
    }

    /// `late` entries were not part of any lineup and get logged.
    fn lookup(&mut self, player: &PlayerRef, late: bool) -> Option<&mut PlayerScore> {
        if player.is_sentinel() {
            return None;
        }

        let known = self.players.get(player.id).is_some();
        if known {
            self.players.get_or_insert(player);
        }

        self.renumber_teams();

        if !known {
            if late {
                tracing::warn!(
                    player = %player.name,
                    id = player.id,
                    rounds_played = self.rounds_played,
                    "Registering player outside of the lineup"
                );
            }
            self.players.get_or_insert(player);

            let members = self.team_members.entry(player.team_id).or_default();
            members.insert(player.id);
            if members.len() > TEAM_SIZE {
                tracing::warn!(
                    team = player.team_id,
                    clan = %player.clan,
                    count = members.len(),
                    added = %player.name,
                    "Team has more players than expected"
                );
            }

            if !player.clan.is_empty() {
                self.team_names
                    .entry(player.team_id)
                    .or_insert_with(|| player.clan.clone());
            }
        }

        self.players.get_mut(player.id)
    }

    pub fn player(&mut self, player: Option<&PlayerRef>) -> Option<&mut PlayerScore> {
        player.and_then(|p| self.get_or_create(p))
    }

    /// Team ids from the decoder do not survive the side swap at half time,
    /// so once past it every roster is rebuilt from the latest snapshots.
    fn renumber_teams(&mut self) {
        let max_rounds = match self.max_rounds {
            Some(m) => m,
            None => return,
        };
        if self.teams_swapped || self.rounds_played <= max_rounds / 2 {
            return;
        }

        tracing::debug!(rounds_played = self.rounds_played, "Renumbering teams after side swap");

        self.team_members.clear();
        self.team_names.clear();
        for score in self.players.iter_mut() {
            if let Some(current) = score.current.as_ref() {
                score.team_id = current.team_id;
                if !current.clan.is_empty() {
                    score.team = current.clan.clone();
                }
            }

            self.team_members
                .entry(score.team_id)
                .or_default()
                .insert(score.steam_id);
            if !score.team.is_empty() {
                self.team_names
                    .entry(score.team_id)
                    .or_insert_with(|| score.team.clone());
            }
        }

        self.teams_swapped = true;
    }

    pub fn start_round(&mut self, participants: &[PlayerRef]) -> RoundStats {
        // Renumbering needs every known snapshot refreshed first.
        for player in participants {
            if self.players.get(player.id).is_some() {
                self.players.get_or_insert(player);
            }
        }
        for player in participants.iter().filter(|p| p.side.is_playing()) {
            self.lookup(player, false);
        }

        let known: Vec<(PlayerId, Side)> = self
            .players
            .iter()
            .map(|p| {
                let side = p.current.as_ref().map(|c| c.side).unwrap_or_default();
                (p.steam_id, side)
            })
            .collect();

        RoundStats::new(participants, known)
    }

    /// Folds the round into the totals. A round that already ended only
    /// moves the round counter.
    pub fn end_round(
        &mut self,
        mut round: Option<&mut RoundStats>,
        winner: Side,
        rounds_played: u32,
        players: &[PlayerState],
    ) {
        if round.as_ref().map(|r| r.ended).unwrap_or(false) {
            tracing::warn!(rounds_played, "Round ended twice");
            self.rounds_played = rounds_played;
            return;
        }

        let clutch_winners = round
            .as_deref()
            .map(|r| clutch::winners(r, winner))
            .unwrap_or_default();

        for state in players.iter().filter(|s| s.player.side.is_playing()) {
            let view = round.as_deref();
            let score = match self.get_or_create(&state.player) {
                Some(s) => s,
                None => continue,
            };

            score.mvps = state.mvps;
            score.money_spent_total = state.money_spent;
            score.team_rounds = state.team_score;
            score.played_rounds += 1;

            let id = score.steam_id;
            for (_, tier) in clutch_winners.iter().filter(|(p, _)| *p == id) {
                score.clutches.win(*tier);
            }

            if let Some(view) = view {
                score.multi_kills.record(view.kills_of(id));
                if view.kast_credit(id) {
                    score.kast_rounds += 1;
                }
            }
        }

        if let Some(round) = round.as_deref_mut() {
            residual::reconcile(round.healths.take(), &mut self.players);
            round.end();
        }

        if rounds_played < self.rounds_played {
            tracing::warn!(previous = self.rounds_played, rounds_played, "Round counter went backwards");
        }
        self.rounds_played = rounds_played;
    }

    pub fn knife_round_snapshot(&self) -> Option<Vec<KnifeRoundStats>> {
        if self.rounds_played != 1 || !self.knife_round {
            return None;
        }

        Some(
            self.players
                .iter()
                .map(|p| KnifeRoundStats {
                    steam_id: p.steam_id,
                    kills: p.kills,
                    assists: p.assists,
                    deaths: p.deaths,
                })
                .collect(),
        )
    }

    pub fn apply_knife_round(&mut self, snapshot: &[KnifeRoundStats]) {
        for knife in snapshot {
            if let Some(score) = self.players.get_mut(knife.steam_id) {
                score.knife_round_kills = knife.kills;
                score.knife_round_assists = knife.assists;
                score.knife_round_deaths = knife.deaths;
            }
        }
    }

    /// Team with the most won rounds, the first seen player's team on ties.
    pub fn winner(&self) -> Option<i32> {
        let mut best: Option<(u32, i32)> = None;
        for player in self.players.iter() {
            if player.team_rounds > best.map(|(r, _)| r).unwrap_or(0) {
                best = Some((player.team_rounds, player.team_id));
            }
        }

        best.map(|(_, team)| team)
    }

    pub fn finalize(mut self, complete: bool, rounds: Vec<Round>) -> BoxScore {
        let winner_team_id = self.winner();
        let winner_team = winner_team_id.and_then(|id| self.team_names.get(&id).cloned());

        let removed = self.players.retain(|p| p.played_rounds > 0);
        if removed > 0 {
            tracing::warn!("Removing {} zero round players", removed);
        }

        let mut player_scores = self.players.into_players();
        player_scores.sort_by(|a, b| b.team_id.cmp(&a.team_id).then(b.kills.cmp(&a.kills)));

        for score in player_scores.iter_mut() {
            score.adr = average_damage(score.damage_done, score.played_rounds);
            score.kast = kast_percentage(score.kast_rounds, score.played_rounds);
        }

        BoxScore {
            player_scores,
            rounds_played: self.rounds_played,
            max_rounds: self.max_rounds,
            map_name: self.map_name,
            team_names: self.team_names,
            team_members: self.team_members,
            winner_team_id,
            winner_team,
            kd_type_bits: classify::kill_type_legend(),
            rounds,
            complete,
        }
    }
}
