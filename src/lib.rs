//! dexdata: per-record JSON game data (items, moves).
//!
//! Raw source records are projected onto a fixed per-kind schema and written one file per
//! entity, named by [data::canonicalize] of the display name. Existing collections are
//! checked against the same naming rule and schema by [data::Validator].

pub mod cli;
pub mod config;
pub mod data;
pub mod errors;
