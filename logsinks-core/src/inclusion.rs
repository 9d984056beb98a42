use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::item::LogItemKind;

/// Which origins of a given kind are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginFilter {
    /// Every origin.
    All,
    /// Only these exact (case-sensitive) origins. Empty accepts nothing.
    Only(BTreeSet<String>),
}

impl OriginFilter {
    pub fn only<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OriginFilter::Only(origins.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, origin: &str) -> bool {
        match self {
            OriginFilter::All => true,
            OriginFilter::Only(origins) => origins.contains(origin),
        }
    }
}

/// Per-destination mapping of kind to accepted origins.
///
/// A kind that is absent from the map is excluded entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionMap {
    kinds: BTreeMap<LogItemKind, OriginFilter>,
}

impl InclusionMap {
    /// Excludes everything.
    pub fn none() -> Self {
        Self::default()
    }

    /// Includes every origin of every kind.
    pub fn all() -> Self {
        LogItemKind::ALL
            .into_iter()
            .fold(Self::none(), |map, kind| map.with_kind(kind, OriginFilter::All))
    }

    pub fn with_kind(mut self, kind: LogItemKind, filter: OriginFilter) -> Self {
        self.kinds.insert(kind, filter);
        self
    }

    pub fn filter_for(&self, kind: LogItemKind) -> Option<&OriginFilter> {
        self.kinds.get(&kind)
    }

    pub fn should_log(&self, kind: LogItemKind, origin: &str) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|filter| filter.accepts(origin))
    }
}

impl fmt::Display for InclusionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kinds.is_empty() {
            return f.write_str("{}");
        }
        let entries: Vec<String> = self
            .kinds
            .iter()
            .map(|(kind, filter)| match filter {
                OriginFilter::All => format!("{kind}: *"),
                OriginFilter::Only(origins) => format!(
                    "{kind}: [{}]",
                    origins.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
            .collect();
        write!(f, "{{{}}}", entries.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = LogItemKind> {
        prop::sample::select(LogItemKind::ALL.to_vec())
    }

    #[test]
    fn test_absent_kind_is_excluded() {
        let map = InclusionMap::none().with_kind(LogItemKind::Info, OriginFilter::All);
        assert!(!map.should_log(LogItemKind::Exception, "anything"));
    }

    #[test]
    fn test_declared_kind_with_empty_set_is_excluded() {
        let map = InclusionMap::none()
            .with_kind(LogItemKind::Info, OriginFilter::only(Vec::<String>::new()));
        assert!(!map.should_log(LogItemKind::Info, "anything"));
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let map = InclusionMap::none().with_kind(
            LogItemKind::Exception,
            OriginFilter::only(["Unhandled Exception"]),
        );
        assert!(map.should_log(LogItemKind::Exception, "Unhandled Exception"));
        assert!(!map.should_log(LogItemKind::Exception, "unhandled exception"));
    }

    #[test]
    fn test_display() {
        let map = InclusionMap::none()
            .with_kind(LogItemKind::Info, OriginFilter::All)
            .with_kind(LogItemKind::Exception, OriginFilter::only(["a", "b"]));
        assert_eq!(map.to_string(), "{Info: *; Exception: [a, b]}");
        assert_eq!(InclusionMap::none().to_string(), "{}");
    }

    proptest! {
        #[test]
        fn prop_wildcard_accepts_every_origin(kind in kind_strategy(), origin in ".*") {
            let map = InclusionMap::none().with_kind(kind, OriginFilter::All);
            prop_assert!(map.should_log(kind, &origin));
        }

        #[test]
        fn prop_missing_kind_rejects(
            kind in kind_strategy(),
            other in kind_strategy(),
            origin in ".*",
        ) {
            prop_assume!(kind != other);
            let map = InclusionMap::none().with_kind(other, OriginFilter::All);
            prop_assert!(!map.should_log(kind, &origin));
        }

        #[test]
        fn prop_set_is_exact_membership(
            kind in kind_strategy(),
            origins in prop::collection::btree_set("[a-zA-Z ]{0,8}", 0..5),
            origin in "[a-zA-Z ]{0,8}",
        ) {
            let expected = origins.contains(&origin);
            let map = InclusionMap::none().with_kind(kind, OriginFilter::Only(origins));
            prop_assert_eq!(map.should_log(kind, &origin), expected);
        }
    }
}
