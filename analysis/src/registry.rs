use std::collections::{BTreeMap, HashMap};

use common::events::{PlayerId, PlayerRef};

use crate::classify::{DamageBucket, KillFacts, KillType};
use crate::clutch::ClutchRecord;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DamageTotals {
    pub dealt: u32,
    pub received: u32,
    pub team_dealt: u32,
    pub team_received: u32,
    pub self_inflicted: u32,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UtilityThrown {
    pub flashes: u32,
    pub hes: u32,
    pub smokes: u32,
    pub decoys: u32,
    pub burns: u32,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlashTally {
    pub enemies_full: u32,
    pub enemies_half: u32,
    pub full_received: u32,
    pub half_received: u32,
    pub teammates_full: u32,
    pub teammates_half: u32,
    pub team_full_received: u32,
    pub team_half_received: u32,
    pub self_full: u32,
    pub self_half: u32,
}

/// Kills (or deaths) with a notable circumstance.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlagTally {
    pub headshot: u32,
    pub through_smoke: u32,
    pub attacker_blind: u32,
    pub flash_assisted: u32,
    pub no_scope: u32,
    pub wallbang: u32,
}

impl FlagTally {
    pub fn record(&mut self, facts: &KillFacts<'_>) {
        self.headshot += facts.headshot as u32;
        self.through_smoke += facts.through_smoke as u32;
        self.attacker_blind += facts.attacker_blind as u32;
        self.flash_assisted += facts.assisted_flash as u32;
        self.no_scope += facts.no_scope as u32;
        self.wallbang += (facts.penetrated_objects > 0) as u32;
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MultiKills {
    pub k2: u32,
    pub k3: u32,
    pub k4: u32,
    pub k5: u32,
}

impl MultiKills {
    pub fn record(&mut self, kills_in_round: u32) {
        match kills_in_round {
            2 => self.k2 += 1,
            3 => self.k3 += 1,
            4 => self.k4 += 1,
            5 => self.k5 += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerScore {
    pub steam_id: PlayerId,
    pub nickname: String,
    pub team: String,
    pub team_id: i32,
    pub team_rounds: u32,
    pub played_rounds: u32,

    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
    pub team_kills: u32,
    pub suicides: u32,
    pub chicken_kills: u32,
    pub mvps: u32,
    pub money_spent_total: u32,

    pub adr: f64,
    pub kast: f64,
    pub kast_rounds: u32,

    pub damage_done: u32,
    pub damage_received: u32,
    pub team_damage_done: u32,
    pub team_damage_received: u32,
    pub kinetic: DamageTotals,
    pub explosive: DamageTotals,
    pub incendiary: DamageTotals,

    pub shots_fired: u32,
    pub shots_on_enemies: u32,
    pub shots_on_teammates: u32,
    pub reloads: u32,

    pub utility: UtilityThrown,
    pub flashes: FlashTally,

    pub kills_by_weapon: BTreeMap<String, u32>,
    pub deaths_by_weapon: BTreeMap<String, u32>,
    pub kills_by_type: BTreeMap<KillType, u32>,
    pub deaths_by_type: BTreeMap<KillType, u32>,

    pub special_kills: FlagTally,
    pub special_deaths: FlagTally,
    pub team_special_kills: FlagTally,
    pub team_special_deaths: FlagTally,
    pub flash_assists: u32,
    pub team_flash_assists: u32,

    pub multi_kills: MultiKills,
    pub entry_count: u32,
    pub entry_wins: u32,
    pub clutches: ClutchRecord,
    pub trade_kills: u32,
    pub traded_deaths: u32,

    pub knife_round_kills: u32,
    pub knife_round_assists: u32,
    pub knife_round_deaths: u32,

    /// The most recent snapshot of this player seen in an event.
    #[serde(skip)]
    pub(crate) current: Option<PlayerRef>,
}

impl PlayerScore {
    pub fn new(player: &PlayerRef) -> Self {
        Self {
            steam_id: player.id,
            nickname: player.name.clone(),
            team: player.clan.clone(),
            team_id: player.team_id,
            current: Some(player.clone()),
            ..Default::default()
        }
    }

    pub fn bucket_mut(&mut self, bucket: DamageBucket) -> &mut DamageTotals {
        match bucket {
            DamageBucket::Kinetic => &mut self.kinetic,
            DamageBucket::Explosive => &mut self.explosive,
            DamageBucket::Incendiary => &mut self.incendiary,
        }
    }
}

/// Identity stable storage of the per-player accumulators, kept in the order
/// players were first seen.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: Vec<PlayerScore>,
    index: HashMap<PlayerId, usize>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerScore> {
        self.index.get(&id).map(|i| &self.players[*i])
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerScore> {
        self.index.get(&id).map(|i| &mut self.players[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerScore> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerScore> {
        self.players.iter_mut()
    }

    /// Returns the entry and whether it was just created. An existing entry
    /// remembers the snapshot it was looked up with.
    pub fn get_or_insert(&mut self, player: &PlayerRef) -> (&mut PlayerScore, bool) {
        match self.index.get(&player.id).copied() {
            Some(i) => {
                let entry = &mut self.players[i];
                entry.current = Some(player.clone());
                (entry, false)
            }
            None => {
                let i = self.players.len();
                self.index.insert(player.id, i);
                self.players.push(PlayerScore::new(player));
                (&mut self.players[i], true)
            }
        }
    }

    /// Keeps the entries matching `keep`, preserving their relative order.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: Fn(&PlayerScore) -> bool,
    {
        let before = self.players.len();
        let players: Vec<PlayerScore> = std::mem::take(&mut self.players)
            .into_iter()
            .filter(|p| keep(p))
            .collect();

        self.index = players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.steam_id, i))
            .collect();
        self.players = players;

        before - self.players.len()
    }

    pub fn into_players(self) -> Vec<PlayerScore> {
        self.players
    }
}
