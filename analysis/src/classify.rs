//! Pure classification of raw event fields.

use common::events::{PlayerRef, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Equipment {
    Unknown,
    Zeus,
    Knife,
    Bomb,
    World,
    Molotov,
    Incendiary,
    Decoy,
    Flash,
    HighExplosive,
    Smoke,
}

// https://github.com/markus-wa/demoinfocs-golang/blob/master/pkg/demoinfocs/common/equipment.go
pub static EQUIPMENT: phf::Map<i32, Equipment> = phf::phf_map! {
    309_i32 => Equipment::Zeus,
    405_i32 => Equipment::Knife,
    406_i32 => Equipment::Bomb,
    407_i32 => Equipment::World,
    502_i32 => Equipment::Molotov,
    503_i32 => Equipment::Incendiary,
    504_i32 => Equipment::Decoy,
    505_i32 => Equipment::Flash,
    506_i32 => Equipment::HighExplosive,
    507_i32 => Equipment::Smoke,
};

impl Equipment {
    pub fn from_code(code: i32) -> Self {
        EQUIPMENT.get(&code).copied().unwrap_or(Self::Unknown)
    }

    pub fn is_melee(&self) -> bool {
        matches!(self, Self::Knife)
    }

    pub fn damage_bucket(&self) -> DamageBucket {
        match self {
            Self::HighExplosive => DamageBucket::Explosive,
            Self::Molotov | Self::Incendiary => DamageBucket::Incendiary,
            _ => DamageBucket::Kinetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageBucket {
    Kinetic,
    Explosive,
    Incendiary,
}

/// How the second player relates to the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Enemy,
    Teammate,
    Own,
}

/// Missing players count as a side of their own, so they are never a
/// teammate of a known player.
pub fn relation(first: Option<&PlayerRef>, second: Option<&PlayerRef>) -> Relation {
    if let (Some(a), Some(b)) = (first, second) {
        if a.id == b.id {
            return Relation::Own;
        }
    }

    let side = |p: Option<&PlayerRef>| -> Option<Side> { p.map(|p| p.side) };
    if side(first) == side(second) {
        Relation::Teammate
    } else {
        Relation::Enemy
    }
}

/// 8-bit kill classification. Several bits can be set at once and the
/// counters are kept per distinct value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KillType(pub u8);

impl KillType {
    pub const TEAMKILL: u8 = 1 << 0;
    pub const THROUGH_SMOKE: u8 = 1 << 1;
    pub const WALLBANG: u8 = 1 << 2;
    pub const HEADSHOT: u8 = 1 << 3;
    pub const NO_SCOPE: u8 = 1 << 4;
    pub const ATTACKER_BLIND: u8 = 1 << 5;
    pub const FLASH_ASSISTED: u8 = 1 << 6;
    pub const SUICIDE: u8 = 1 << 7;

    pub fn contains(&self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

pub static KILL_TYPE_BITS: [(u8, &str); 8] = [
    (0, "teamkill"),
    (1, "through smoke"),
    (2, "wallbang"),
    (3, "headshot"),
    (4, "no scope"),
    (5, "attacker blind"),
    (6, "victim flashed"),
    (7, "suicide"),
];

pub fn kill_type_legend() -> std::collections::BTreeMap<u8, String> {
    KILL_TYPE_BITS
        .iter()
        .map(|(bit, name)| (*bit, (*name).to_owned()))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct KillFacts<'a> {
    pub killer: Option<&'a PlayerRef>,
    pub victim: &'a PlayerRef,
    pub through_smoke: bool,
    pub penetrated_objects: u32,
    pub headshot: bool,
    pub no_scope: bool,
    pub attacker_blind: bool,
    pub assisted_flash: bool,
}

pub fn kill_type(facts: &KillFacts<'_>) -> KillType {
    let (teamkill, suicide) = match facts.killer {
        Some(killer) => (
            killer.side == facts.victim.side && killer.id != facts.victim.id,
            killer.id == facts.victim.id,
        ),
        None => (false, false),
    };

    let bits = [
        (teamkill, KillType::TEAMKILL),
        (facts.through_smoke, KillType::THROUGH_SMOKE),
        (facts.penetrated_objects > 0, KillType::WALLBANG),
        (facts.headshot, KillType::HEADSHOT),
        (facts.no_scope, KillType::NO_SCOPE),
        (facts.attacker_blind, KillType::ATTACKER_BLIND),
        (facts.assisted_flash, KillType::FLASH_ASSISTED),
        (suicide, KillType::SUICIDE),
    ];

    KillType(
        bits.into_iter()
            .filter(|(set, _)| *set)
            .fold(0, |acc, (_, bit)| acc | bit),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashTier {
    Full,
    Half,
}

pub fn flash_tier(duration: f32, full_threshold: f32) -> FlashTier {
    if duration > full_threshold {
        FlashTier::Full
    } else {
        FlashTier::Half
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashEffect {
    pub relation: Relation,
    pub tier: FlashTier,
}

/// A flash without a known victim is counted as a full flash on whoever the
/// thrower is not.
pub fn classify_flash(
    attacker: Option<&PlayerRef>,
    player: Option<&PlayerRef>,
    duration: f32,
    full_threshold: f32,
) -> Option<FlashEffect> {
    match (attacker, player) {
        (None, None) => None,
        (_, None) => Some(FlashEffect {
            relation: Relation::Enemy,
            tier: FlashTier::Full,
        }),
        (attacker, Some(player)) => Some(FlashEffect {
            relation: relation(attacker, Some(player)),
            tier: flash_tier(duration, full_threshold),
        }),
    }
}
