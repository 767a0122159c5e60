//! Pure ranking stages: scoring, constraint filtering, and result assembly.

pub mod assemble;
pub mod filter;
pub mod score;

pub use assemble::assemble;
pub use filter::{filter, match_ratio};
pub use score::{base_similarity, query_words, score};
