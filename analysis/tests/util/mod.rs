#![allow(dead_code)]

use common::events::{Event, PlayerRef, PlayerState, Side, Weapon};

pub const T_TEAM: i32 = 2;
pub const CT_TEAM: i32 = 3;

pub fn player(id: u64, name: &str, side: Side) -> PlayerRef {
    let (team_id, clan) = match side {
        Side::Terrorists => (T_TEAM, "Alpha"),
        Side::CounterTerrorists => (CT_TEAM, "Bravo"),
        _ => (0, ""),
    };

    PlayerRef {
        id,
        name: name.to_owned(),
        side,
        team_id,
        clan: clan.to_owned(),
        alive: true,
    }
}

pub fn t(id: u64, name: &str) -> PlayerRef {
    player(id, name, Side::Terrorists)
}

pub fn ct(id: u64, name: &str) -> PlayerRef {
    player(id, name, Side::CounterTerrorists)
}

pub fn dead(player: &PlayerRef) -> PlayerRef {
    PlayerRef {
        alive: false,
        ..player.clone()
    }
}

pub fn ak47() -> Weapon {
    Weapon {
        name: "AK-47".to_owned(),
        code: 303,
    }
}

pub fn knife() -> Weapon {
    Weapon {
        name: "Knife".to_owned(),
        code: 405,
    }
}

pub fn world() -> Weapon {
    Weapon {
        name: "World".to_owned(),
        code: 407,
    }
}

pub fn molotov() -> Weapon {
    Weapon {
        name: "Molotov".to_owned(),
        code: 502,
    }
}

pub fn he() -> Weapon {
    Weapon {
        name: "HE Grenade".to_owned(),
        code: 506,
    }
}

pub fn match_start(players: &[PlayerRef]) -> Event {
    Event::MatchStart {
        max_rounds: Some("24".to_owned()),
        participants: players.to_vec(),
    }
}

pub fn round_start(players: &[PlayerRef]) -> Event {
    Event::RoundStart {
        participants: players.to_vec(),
    }
}

/// `scores` are the round scores of the T and CT side after this round.
pub fn round_end(winner: Side, rounds_played: u32, players: &[PlayerRef], scores: (u32, u32)) -> Event {
    let players = players
        .iter()
        .map(|p| PlayerState {
            player: p.clone(),
            team_score: match p.side {
                Side::Terrorists => scores.0,
                _ => scores.1,
            },
            mvps: 0,
            money_spent: 0,
        })
        .collect();

    Event::RoundEnd {
        winner,
        reason: if winner == Side::Terrorists { 9 } else { 8 },
        rounds_played,
        players,
    }
}

pub fn hurt(attacker: &PlayerRef, victim: &PlayerRef, weapon: Weapon, damage_taken: u32, health: u32) -> Event {
    Event::PlayerHurt {
        attacker: Some(attacker.clone()),
        player: victim.clone(),
        weapon,
        damage_taken,
        health,
    }
}

pub fn kill(killer: &PlayerRef, victim: &PlayerRef) -> Event {
    KillBuilder::new(Some(killer), victim).build()
}

pub fn fire(shooter: &PlayerRef) -> Event {
    Event::WeaponFire {
        shooter: Some(shooter.clone()),
    }
}

pub struct KillBuilder {
    event: Event,
}

impl KillBuilder {
    pub fn new(killer: Option<&PlayerRef>, victim: &PlayerRef) -> Self {
        Self {
            event: Event::Kill {
                tick: 0,
                killer: killer.cloned(),
                victim: victim.clone(),
                assister: None,
                weapon: ak47(),
                through_smoke: false,
                penetrated_objects: 0,
                headshot: false,
                no_scope: false,
                attacker_blind: false,
                assisted_flash: false,
            },
        }
    }

    fn fields(&mut self) -> &mut Event {
        &mut self.event
    }

    pub fn tick(mut self, value: u32) -> Self {
        if let Event::Kill { tick, .. } = self.fields() {
            *tick = value;
        }
        self
    }

    pub fn weapon(mut self, value: Weapon) -> Self {
        if let Event::Kill { weapon, .. } = self.fields() {
            *weapon = value;
        }
        self
    }

    pub fn assister(mut self, value: &PlayerRef) -> Self {
        if let Event::Kill { assister, .. } = self.fields() {
            *assister = Some(value.clone());
        }
        self
    }

    pub fn headshot(mut self) -> Self {
        if let Event::Kill { headshot, .. } = self.fields() {
            *headshot = true;
        }
        self
    }

    pub fn through_smoke(mut self) -> Self {
        if let Event::Kill { through_smoke, .. } = self.fields() {
            *through_smoke = true;
        }
        self
    }

    pub fn wallbang(mut self) -> Self {
        if let Event::Kill { penetrated_objects, .. } = self.fields() {
            *penetrated_objects = 1;
        }
        self
    }

    pub fn no_scope(mut self) -> Self {
        if let Event::Kill { no_scope, .. } = self.fields() {
            *no_scope = true;
        }
        self
    }

    pub fn attacker_blind(mut self) -> Self {
        if let Event::Kill { attacker_blind, .. } = self.fields() {
            *attacker_blind = true;
        }
        self
    }

    pub fn assisted_flash(mut self) -> Self {
        if let Event::Kill { assisted_flash, .. } = self.fields() {
            *assisted_flash = true;
        }
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}

pub fn feed(aggregator: &mut analysis::endofgame::Aggregator, events: &[Event]) {
    for event in events {
        aggregator.handle(event).unwrap();
    }
}

pub fn new_aggregator() -> analysis::endofgame::Aggregator {
    analysis::endofgame::Aggregator::new(analysis::endofgame::Config::default())
}

pub fn score<'a>(
    aggregator: &'a analysis::endofgame::Aggregator,
    id: u64,
) -> &'a analysis::registry::PlayerScore {
    aggregator.scoreboard().unwrap().players.get(id).unwrap()
}
