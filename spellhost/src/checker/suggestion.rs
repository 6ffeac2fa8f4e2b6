//! Owned suggestion sequences.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// An owned, ordered set of correction candidates for one query.
///
/// The order is the engine's ranking order and is preserved verbatim; by the
/// time a `SuggestionSet` exists, every native engine buffer behind it has
/// already been released.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionSet {
    values: Vec<SmolStr>,
}

impl SuggestionSet {
    /// Creates an empty set.
    pub fn new() -> SuggestionSet {
        SuggestionSet { values: Vec::new() }
    }

    pub(crate) fn from_values(values: Vec<SmolStr>) -> SuggestionSet {
        SuggestionSet { values }
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the query produced no candidates.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the candidates in ranking order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(SmolStr::as_str)
    }

    /// The candidates as a slice, in ranking order.
    pub fn values(&self) -> &[SmolStr] {
        &self.values
    }

    /// Whether `word` is among the candidates.
    pub fn contains(&self, word: &str) -> bool {
        self.values.iter().any(|v| v == word)
    }
}

impl IntoIterator for SuggestionSet {
    type Item = SmolStr;
    type IntoIter = std::vec::IntoIter<SmolStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_and_serializes_flat() {
        let set = SuggestionSet::from_values(vec![
            SmolStr::new("zeta"),
            SmolStr::new("alpha"),
        ]);

        assert_eq!(set.len(), 2);
        assert!(set.contains("alpha"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["zeta","alpha"]"#
        );
    }
}
