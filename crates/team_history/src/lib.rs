//! Team history — tvarování dat z výsledků zápasů
//!
//! Čistá logika bez I/O:
//!   - slug z názvu týmu (`slugify`)
//!   - tabulka aliasů (uzávěr spočítaný jednou při startu)
//!   - validace syrových záznamů (pass/fail + důvod)
//!   - historie zápasů per tým, seřazená podle data, zrcadlená pod aliasy

pub mod aliases;
pub mod history;
pub mod model;
pub mod slug;
pub mod validate;

pub use aliases::{AliasTable, DEFAULT_ALIAS_PAIRS};
pub use history::{build_histories, HistoryBuild};
pub use model::{MatchResult, RawMatch, TeamEntry, TeamHistoryRecord, Venue};
pub use slug::slugify;
pub use validate::{validate, SkipReason};
