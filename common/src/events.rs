//! The event vocabulary a demo decoder hands to the analysis.
//!
//! Every variant of [`Event`] corresponds to one kind of occurrence in the
//! demo. Player references are snapshots of the player at the moment the
//! event fired, so team identity and life state travel with the event.

/// Stable player identity (the steam id for real players).
pub type PlayerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Side {
    #[default]
    Unassigned,
    Spectators,
    Terrorists,
    CounterTerrorists,
}

impl Side {
    /// Only the two playing sides take part in rounds.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Terrorists | Self::CounterTerrorists)
    }

    pub fn opponent(&self) -> Option<Self> {
        match self {
            Self::Terrorists => Some(Self::CounterTerrorists),
            Self::CounterTerrorists => Some(Self::Terrorists),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
    pub side: Side,
    /// Team identifier as reported by the decoder. Not guaranteed to survive
    /// a side swap.
    pub team_id: i32,
    #[serde(default)]
    pub clan: String,
    #[serde(default = "alive_default")]
    pub alive: bool,
}

fn alive_default() -> bool {
    true
}

impl PlayerRef {
    /// The unknown player and the broadcast bot never get a score entry.
    pub fn is_sentinel(&self) -> bool {
        self.id == 0 || self.name == "SourceTV"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Weapon {
    pub name: String,
    /// Decoder equipment code.
    pub code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GrenadeKind {
    Flash,
    HighExplosive,
    Smoke,
    Decoy,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    pub player: PlayerRef,
    pub team_score: u32,
    #[serde(default)]
    pub mvps: u32,
    #[serde(default)]
    pub money_spent: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    MatchStart {
        /// Raw `mp_maxrounds` value.
        max_rounds: Option<String>,
        participants: Vec<PlayerRef>,
    },
    Metadata {
        map_name: String,
    },
    RoundStart {
        participants: Vec<PlayerRef>,
    },
    RoundEnd {
        winner: Side,
        #[serde(default)]
        reason: i32,
        /// Authoritative number of rounds played, including this one.
        rounds_played: u32,
        players: Vec<PlayerState>,
    },
    Kill {
        #[serde(default)]
        tick: u32,
        killer: Option<PlayerRef>,
        victim: PlayerRef,
        #[serde(default)]
        assister: Option<PlayerRef>,
        weapon: Weapon,
        #[serde(default)]
        through_smoke: bool,
        #[serde(default)]
        penetrated_objects: u32,
        #[serde(default)]
        headshot: bool,
        #[serde(default)]
        no_scope: bool,
        #[serde(default)]
        attacker_blind: bool,
        #[serde(default)]
        assisted_flash: bool,
    },
    OtherDeath {
        killer: Option<PlayerRef>,
        other_type: String,
    },
    Grenade {
        kind: GrenadeKind,
        thrower: Option<PlayerRef>,
        entity_id: i32,
    },
    InfernoStart {
        thrower: Option<PlayerRef>,
    },
    WeaponFire {
        shooter: Option<PlayerRef>,
    },
    WeaponReload {
        player: Option<PlayerRef>,
    },
    PlayerFlashed {
        attacker: Option<PlayerRef>,
        player: Option<PlayerRef>,
        /// Seconds.
        duration: f32,
    },
    PlayerHurt {
        attacker: Option<PlayerRef>,
        player: PlayerRef,
        weapon: Weapon,
        damage_taken: u32,
        /// Health left after the hit.
        health: u32,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MatchStart { .. } => "MatchStart",
            Self::Metadata { .. } => "Metadata",
            Self::RoundStart { .. } => "RoundStart",
            Self::RoundEnd { .. } => "RoundEnd",
            Self::Kill { .. } => "Kill",
            Self::OtherDeath { .. } => "OtherDeath",
            Self::Grenade { .. } => "Grenade",
            Self::InfernoStart { .. } => "InfernoStart",
            Self::WeaponFire { .. } => "WeaponFire",
            Self::WeaponReload { .. } => "WeaponReload",
            Self::PlayerFlashed { .. } => "PlayerFlashed",
            Self::PlayerHurt { .. } => "PlayerHurt",
        }
    }
}

/// What a decoder reports when it cannot hand over the next event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DecoderError {
    /// The demo ended before the match did.
    UnexpectedEnd,
    Other(String),
}
