//! Fuzzy filtering for the server list.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Case-insensitive fuzzy matcher.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default(),
        }
    }

    /// Best score of `pattern` against any of `texts`, or `None` if none match.
    pub fn best_score<'a>(
        &self,
        texts: impl IntoIterator<Item = &'a str>,
        pattern: &str,
    ) -> Option<i64> {
        let pattern = pattern.to_lowercase();
        texts
            .into_iter()
            .filter_map(|text| self.inner.fuzzy_match(text, &pattern))
            .max()
    }

    /// Keep the items matching `pattern`, best match first.
    ///
    /// An empty pattern keeps every item in its original order.
    pub fn filter<T, K>(&self, items: &[T], pattern: &str, keys: K) -> Vec<T>
    where
        T: Clone,
        K: Fn(&T) -> Vec<&str>,
    {
        if pattern.is_empty() {
            return items.to_vec();
        }

        let mut scored: Vec<(i64, usize)> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.best_score(keys(item), pattern)
                    .map(|score| (score, index))
            })
            .collect();
        // Stable on ties so equal scores keep list order
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .map(|(_, index)| items[index].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_score() {
        let matcher = Matcher::new();

        assert!(matcher.best_score(["general-chat"], "gch").is_some());
        assert!(matcher.best_score(["GAMING"], "gam").is_some());
        assert!(matcher.best_score(["gaming"], "GAM").is_some());
        assert!(matcher.best_score(["hello", "world"], "xyz").is_none());

        let exact = matcher.best_score(["api"], "api").unwrap();
        let fuzzy = matcher.best_score(["a-p-i-key"], "api").unwrap();
        assert!(exact >= fuzzy);
    }

    #[test]
    fn test_filter_ranks_and_keeps_order() {
        let matcher = Matcher::new();
        let items = vec!["rust-lang", "gaming", "rustaceans"];

        let all = matcher.filter(&items, "", |s| vec![*s]);
        assert_eq!(all, items);

        let rust = matcher.filter(&items, "rust", |s| vec![*s]);
        assert_eq!(rust.len(), 2);
        assert!(!rust.contains(&"gaming"));

        assert!(matcher.filter(&items, "zzz", |s| vec![*s]).is_empty());
    }

    #[test]
    fn test_filter_matches_any_key() {
        let matcher = Matcher::new();
        let items = vec![("s1", "Alpha"), ("s2", "Beta")];

        let by_id = matcher.filter(&items, "s2", |(id, name)| vec![*id, *name]);
        assert_eq!(by_id, vec![("s2", "Beta")]);
    }
}
