//! Per-player box scores from the event stream of a single match.
//!
//! Events are fed in order into an [`endofgame::Aggregator`] (or through
//! [`endofgame::parse`]) which keeps the round state, detects clutches,
//! reconciles misattributed damage and finally yields a
//! [`scoreboard::BoxScore`].

pub mod classify;
pub mod clutch;
pub mod endofgame;
pub mod perround;
pub mod registry;
pub mod residual;
pub mod round;
pub mod scoreboard;
pub mod shared;

mod error;
pub use error::Error;
