use std::collections::HashMap;

use crate::models::{ItemMetadata, NamedEntity, SignalCategory};

use super::RecommendationSettings;

/// Occurrence counts per signal id, remembering first-seen order for tie-breaks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalTally {
    first_seen: Vec<u64>,
    counts: HashMap<u64, usize>,
}

impl SignalTally {
    pub fn record(&mut self, id: u64) {
        let count = self.counts.entry(id).or_insert(0);
        if *count == 0 {
            self.first_seen.push(id);
        }
        *count += 1;
    }

    pub fn count(&self, id: u64) -> usize {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// The `n` ids with the highest counts; equal counts keep first-seen order
    pub fn top(&self, n: usize) -> Vec<u64> {
        let mut ranked: Vec<(u64, usize)> = self
            .first_seen
            .iter()
            .map(|id| (*id, self.count(*id)))
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(id, _)| id).collect()
    }

    fn record_all<'a>(&mut self, entities: impl IntoIterator<Item = &'a NamedEntity>) {
        for entity in entities {
            self.record(entity.id);
        }
    }
}

/// One tally per signal category, built fresh for each aggregation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalTallies {
    pub genres: SignalTally,
    pub directors: SignalTally,
    pub cast: SignalTally,
    pub keywords: SignalTally,
}

impl SignalTallies {
    /// True when no sampled item carried any signal at all
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.directors.is_empty()
            && self.cast.is_empty()
            && self.keywords.is_empty()
    }

    pub fn top_signals(&self, settings: &RecommendationSettings) -> TopSignals {
        TopSignals {
            genres: self.genres.top(settings.top_genres),
            directors: self.directors.top(settings.top_directors),
            cast: self.cast.top(settings.top_cast),
            keywords: self.keywords.top(settings.top_keywords),
        }
    }
}

/// Highest-count signal ids per category, the input to discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopSignals {
    pub genres: Vec<u64>,
    pub directors: Vec<u64>,
    pub cast: Vec<u64>,
    pub keywords: Vec<u64>,
}

impl TopSignals {
    pub fn ids(&self, category: SignalCategory) -> &[u64] {
        match category {
            SignalCategory::Keyword => &self.keywords,
            SignalCategory::Genre => &self.genres,
            SignalCategory::Cast => &self.cast,
            SignalCategory::Director => &self.directors,
        }
    }
}

/// Tallies genres, directors, top-billed cast and keywords across `items`
///
/// Only the first `cast_depth` cast entries of each item are counted.
pub fn extract_signals(items: &[ItemMetadata], cast_depth: usize) -> SignalTallies {
    let mut tallies = SignalTallies::default();

    for item in items {
        tallies.genres.record_all(&item.genres);
        tallies.directors.record_all(&item.directors);
        tallies.cast.record_all(item.cast.iter().take(cast_depth));
        tallies.keywords.record_all(&item.keywords);
    }

    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieId;

    fn named(ids: &[u64]) -> Vec<NamedEntity> {
        ids.iter()
            .map(|id| NamedEntity {
                id: *id,
                name: format!("entity {}", id),
            })
            .collect()
    }

    fn item(id: u64, genres: &[u64], directors: &[u64], cast: &[u64], keywords: &[u64]) -> ItemMetadata {
        ItemMetadata {
            id: MovieId(id),
            title: format!("Movie {}", id),
            release_date: None,
            overview: None,
            runtime: None,
            genres: named(genres),
            directors: named(directors),
            cast: named(cast),
            keywords: named(keywords),
        }
    }

    #[test]
    fn test_counts_each_category() {
        let items = vec![
            item(1, &[28, 12], &[525], &[6193, 24045], &[10051]),
            item(2, &[28], &[525], &[6193], &[10051, 9748]),
        ];

        let tallies = extract_signals(&items, 5);

        assert_eq!(tallies.genres.count(28), 2);
        assert_eq!(tallies.genres.count(12), 1);
        assert_eq!(tallies.directors.count(525), 2);
        assert_eq!(tallies.cast.count(6193), 2);
        assert_eq!(tallies.cast.count(24045), 1);
        assert_eq!(tallies.keywords.count(10051), 2);
        assert_eq!(tallies.keywords.count(9748), 1);
        assert_eq!(tallies.keywords.count(1), 0);
    }

    #[test]
    fn test_only_top_billed_cast_counted() {
        let items = vec![item(1, &[], &[], &[1, 2, 3, 4, 5, 6, 7], &[])];

        let tallies = extract_signals(&items, 5);

        assert_eq!(tallies.cast.len(), 5);
        assert_eq!(tallies.cast.count(5), 1);
        assert_eq!(tallies.cast.count(6), 0);
        assert_eq!(tallies.cast.count(7), 0);
    }

    #[test]
    fn test_top_orders_by_count_then_first_seen() {
        let mut tally = SignalTally::default();
        for id in [5, 3, 9, 3, 9, 7, 7] {
            tally.record(id);
        }

        // 3, 9 and 7 all have two hits; 3 was seen first, then 9, then 7
        assert_eq!(tally.top(3), vec![3, 9, 7]);
        assert_eq!(tally.top(2), vec![3, 9]);
        assert_eq!(tally.top(10), vec![3, 9, 7, 5]);
    }

    #[test]
    fn test_top_of_empty_tally() {
        assert!(SignalTally::default().top(3).is_empty());
    }

    #[test]
    fn test_no_signal_detection() {
        let items = vec![item(1, &[], &[], &[], &[]), item(2, &[], &[], &[], &[])];
        assert!(extract_signals(&items, 5).is_empty());
        assert!(extract_signals(&[], 5).is_empty());

        let items = vec![item(1, &[], &[], &[], &[10051])];
        assert!(!extract_signals(&items, 5).is_empty());
    }

    #[test]
    fn test_top_signals_respect_settings() {
        let items = vec![
            item(1, &[1, 2, 3, 4], &[10, 11, 12], &[20, 21, 22, 23], &[30, 31, 32]),
            item(2, &[4], &[12], &[23], &[32]),
        ];

        let top = extract_signals(&items, 5).top_signals(&RecommendationSettings::default());

        assert_eq!(top.genres, vec![4, 1, 2]);
        assert_eq!(top.directors, vec![12, 10]);
        assert_eq!(top.cast, vec![23, 20, 21]);
        assert_eq!(top.keywords, vec![32, 30]);
        assert_eq!(top.ids(SignalCategory::Director), &[12, 10]);
    }
}
