//! Understat dump — knihovní část pro binárky
//!
//! `config`   — DumpConfig z env
//! `pipeline` — fetch ligy → league/team/match JSON snapshoty

pub mod config;
pub mod pipeline;

pub use config::DumpConfig;
pub use pipeline::{run_dump, teams_from_matches, DumpSummary};
