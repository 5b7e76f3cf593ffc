//! Relevance tiers
//!
//! Within a group, records are ordered by:
//! 1. classified field equal to the query
//! 2. classified field starting with the query
//! 3. everything else
//!
//! and alphabetically by the lowercased field inside a tier.

use crate::classify::ClassifiedQuery;
use partlookup_common::PartRecord;

/// Relevance tier, lower is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Exact,
    Prefix,
    Contains,
}

impl Tier {
    pub fn of(query: &ClassifiedQuery, field_lower: &str) -> Self {
        if field_lower == query.needle() {
            Tier::Exact
        } else if field_lower.starts_with(query.needle()) {
            Tier::Prefix
        } else {
            Tier::Contains
        }
    }
}

/// Sort `records` by tier, then alphabetically. Stable for equal keys.
pub fn rank_by_relevance(query: &ClassifiedQuery, records: &mut [&PartRecord]) {
    records.sort_by_cached_key(|record| {
        let field = query.kind.field(record).to_lowercase();
        (Tier::of(query, &field), field)
    });
}
