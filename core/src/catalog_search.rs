//! Fuzzy filtering of a catalog slice for the entity pickers.

use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;
use quill_protocol::EntitySummary;

/// One entry that matched the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMatch {
    pub entity: EntitySummary,
    pub score: u32,
    /// Char positions in `entity.name` that matched, ascending.
    pub indices: Vec<usize>,
}

/// Filter `entries` by `query`, best match first. Ties keep catalog order.
///
/// A blank query matches everything, in catalog order, with no highlights.
pub fn search(query: &str, entries: &[EntitySummary]) -> Vec<EntityMatch> {
    let query = query.trim();
    if query.is_empty() {
        return entries
            .iter()
            .map(|entity| EntityMatch {
                entity: entity.clone(),
                score: 0,
                indices: Vec::new(),
            })
            .collect();
    }

    let pattern = create_pattern(query);
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let mut utf32buf = Vec::<char>::new();
    let mut indices = Vec::<u32>::new();

    let mut matches: Vec<EntityMatch> = entries
        .iter()
        .filter_map(|entity| {
            indices.clear();
            let haystack: Utf32Str<'_> = Utf32Str::new(&entity.name, &mut utf32buf);
            let score = pattern.indices(haystack, &mut matcher, &mut indices)?;
            let mut positions: Vec<usize> = indices.iter().map(|i| *i as usize).collect();
            positions.sort_unstable();
            positions.dedup();
            Some(EntityMatch {
                entity: entity.clone(),
                score,
                indices: positions,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

fn create_pattern(pattern: &str) -> Pattern {
    Pattern::new(
        pattern,
        CaseMatching::Smart,
        Normalization::Smart,
        AtomKind::Fuzzy,
    )
}
