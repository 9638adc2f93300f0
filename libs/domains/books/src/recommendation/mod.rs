//! Semantic recommendation: vector shortlist reranked by an LLM.

mod engine;
pub mod parser;

pub use engine::{MATCH_MESSAGE, MAX_RECOMMENDATIONS, NO_MATCH_MESSAGE, RecommendationEngine};
pub use parser::{ParsedReply, parse_reply};
