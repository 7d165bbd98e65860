use common::events::{PlayerId, Side};

use crate::classify::KillType;
use crate::clutch::ClutchEvent;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WinReason {
    StillInProgress,
    BombExploded,
    VipEscaped,
    VipKilled,
    TSaved,
    CtStoppedEscape,
    RoundEndReasonTerroristsStopped,
    BombDefused,
    TKilled,
    CTKilled,
    Draw,
    HostageRescued,
    TimeRanOut,
    RoundEndReasonHostagesNotRescued,
    TerroristsNotEscaped,
    VipNotEscaped,
    GameStart,
    TSurrender,
    CTSurrender,
    TPlanted,
    CTReachedHostage,
}

// https://github.com/markus-wa/demoinfocs-golang/blob/205b0bb25e9f3e96e1d306d154199b4a6292940e/pkg/demoinfocs/events/events.go#L53
pub static ROUND_WIN_REASON: phf::Map<i32, WinReason> = phf::phf_map! {
    0_i32 => WinReason::StillInProgress,
    1_i32 => WinReason::BombExploded,
    2_i32 => WinReason::VipEscaped,
    3_i32 => WinReason::VipKilled,
    4_i32 => WinReason::TSaved,
    5_i32 => WinReason::CtStoppedEscape,
    6_i32 => WinReason::RoundEndReasonTerroristsStopped,
    7_i32 => WinReason::BombDefused,
    8_i32 => WinReason::TKilled,
    9_i32 => WinReason::CTKilled,
    10_i32 => WinReason::Draw,
    11_i32 => WinReason::HostageRescued,
    12_i32 => WinReason::TimeRanOut,
    13_i32 => WinReason::RoundEndReasonHostagesNotRescued,
    14_i32 => WinReason::TerroristsNotEscaped,
    15_i32 => WinReason::VipNotEscaped,
    16_i32 => WinReason::GameStart,
    17_i32 => WinReason::TSurrender,
    18_i32 => WinReason::CTSurrender,
    19_i32 => WinReason::TPlanted,
    20_i32 => WinReason::CTReachedHostage,
};

impl WinReason {
    pub fn from_code(code: i32) -> Self {
        ROUND_WIN_REASON
            .get(&code)
            .cloned()
            .unwrap_or(WinReason::StillInProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RoundEvent {
    Kill {
        tick: u32,
        attacker: Option<PlayerId>,
        died: PlayerId,
        kill_type: KillType,
    },
    Clutch {
        player: PlayerId,
        enemies: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Round {
    pub number: u32,
    pub winner: Side,
    pub winreason: WinReason,
    pub events: Vec<RoundEvent>,
}

/// Collects the events of the running round until it ends.
#[derive(Debug, Default)]
pub struct RoundLog {
    current: Vec<RoundEvent>,
    rounds: Vec<Round>,
}

impl RoundLog {
    pub fn kill(&mut self, tick: u32, attacker: Option<PlayerId>, died: PlayerId, kill_type: KillType) {
        self.current.push(RoundEvent::Kill {
            tick,
            attacker,
            died,
            kill_type,
        });
    }

    pub fn clutch(&mut self, clutch: &ClutchEvent) {
        self.current.push(RoundEvent::Clutch {
            player: clutch.player(),
            enemies: clutch.tier().get(),
        });
    }

    pub fn finish(&mut self, number: u32, winner: Side, reason: i32) {
        self.rounds.push(Round {
            number,
            winner,
            winreason: WinReason::from_code(reason),
            events: std::mem::take(&mut self.current),
        });
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.rounds.clear();
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn into_rounds(self) -> Vec<Round> {
        self.rounds
    }
}
