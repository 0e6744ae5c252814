use std::collections::HashSet;

use crate::models::{MovieId, SignalCategory};

use super::candidates::CandidatePools;

/// Pools consulted, in order, when keyword discovery found nothing
pub const FALLBACK_PRIORITY: [SignalCategory; 3] = [
    SignalCategory::Genre,
    SignalCategory::Cast,
    SignalCategory::Director,
];

/// Categories whose candidates make up the pool for this merge
///
/// Keyword candidates, when there are any, are used on their own.
pub fn candidate_sources(pools: &CandidatePools) -> Vec<SignalCategory> {
    if pools.by_keyword.is_empty() {
        FALLBACK_PRIORITY.to_vec()
    } else {
        vec![SignalCategory::Keyword]
    }
}

/// Merges candidate pools into at most `cap` unique ids not present in `exclude`
pub fn merge(pools: &CandidatePools, exclude: &HashSet<MovieId>, cap: usize) -> Vec<MovieId> {
    let mut emitted = HashSet::new();
    let mut result = Vec::with_capacity(cap);

    let candidates = candidate_sources(pools)
        .into_iter()
        .flat_map(|category| pools.get(category).iter().copied());

    for id in candidates {
        if result.len() >= cap {
            break;
        }
        if exclude.contains(&id) || !emitted.insert(id) {
            continue;
        }
        result.push(id);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<MovieId> {
        raw.iter().copied().map(MovieId).collect()
    }

    fn exclude(raw: &[u64]) -> HashSet<MovieId> {
        raw.iter().copied().map(MovieId).collect()
    }

    #[test]
    fn test_keyword_pool_used_exclusively() {
        let pools = CandidatePools {
            by_keyword: ids(&[1, 2]),
            by_genre: ids(&[3, 4]),
            by_cast: ids(&[5]),
            by_director: ids(&[6]),
        };

        assert_eq!(candidate_sources(&pools), vec![SignalCategory::Keyword]);
        assert_eq!(merge(&pools, &exclude(&[]), 10), ids(&[1, 2]));
    }

    #[test]
    fn test_fallback_concatenates_genre_cast_director() {
        let pools = CandidatePools {
            by_keyword: vec![],
            by_genre: ids(&[3, 4]),
            by_cast: ids(&[4, 5]),
            by_director: ids(&[6, 3]),
        };

        assert_eq!(merge(&pools, &exclude(&[]), 10), ids(&[3, 4, 5, 6]));
    }

    #[test]
    fn test_excluded_ids_skipped() {
        let pools = CandidatePools {
            by_keyword: ids(&[100, 101, 1]),
            ..CandidatePools::default()
        };

        assert_eq!(merge(&pools, &exclude(&[1, 2]), 10), ids(&[100, 101]));
    }

    #[test]
    fn test_cap_applied_after_filtering() {
        let pools = CandidatePools {
            by_genre: (1..=30).map(MovieId).collect(),
            ..CandidatePools::default()
        };

        let merged = merge(&pools, &exclude(&[1, 2, 3]), 10);
        assert_eq!(merged, (4..=13).map(MovieId).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_pools_empty() {
        assert!(merge(&CandidatePools::default(), &exclude(&[]), 10).is_empty());
    }

    #[test]
    fn test_everything_excluded() {
        let pools = CandidatePools {
            by_genre: ids(&[1, 2]),
            by_cast: ids(&[2]),
            ..CandidatePools::default()
        };

        assert!(merge(&pools, &exclude(&[1, 2]), 10).is_empty());
    }

    #[test]
    fn test_zero_cap() {
        let pools = CandidatePools {
            by_keyword: ids(&[1]),
            ..CandidatePools::default()
        };

        assert!(merge(&pools, &exclude(&[]), 0).is_empty());
    }
}
