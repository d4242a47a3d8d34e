//! Retrieval-augmented classification support
//!
//! Query planning, web search and evidence formatting. Each piece degrades
//! to "no evidence" instead of failing the request.

pub mod evidence;
pub mod planner;
pub mod search;

pub use evidence::{empty_evidence, format_evidence, NO_RESULTS_TEXT};
pub use planner::{PlanOutcome, QueryPlanner};
pub use search::{GoogleSearchBackend, SearchBackend};
