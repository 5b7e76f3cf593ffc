//! Result ordering
//!
//! Two independent concerns:
//! - priority groups across origins, with code deduplication
//! - optional relevance tiers applied inside each group

mod priority;
mod relevance;

pub use priority::{PriorityGroup, PriorityGroups};
pub use relevance::{rank_by_relevance, Tier};
