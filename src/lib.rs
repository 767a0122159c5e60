//! Language-aware retrieval and ranking of travel places from a semantic index.

pub mod assistant;
pub mod config;
pub mod index;
pub mod lang;
pub mod model;
pub mod nlu;
pub mod rank;
pub mod report;
mod retry;
pub mod search;

pub const USER_AGENT: &str = concat!("travel-search/", env!("CARGO_PKG_VERSION"));

pub use assistant::{Answer, Assistant, Reply};
pub use config::Settings;
pub use lang::Language;
pub use model::{Candidate, ConstraintSet, RankedResultSet, ScoredCandidate};
pub use search::{SearchError, Searcher};
