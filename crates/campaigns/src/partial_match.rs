//! String matching shared by qualifiers and selectors.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use promo_core::ConfigError;

/// How a subject string is compared against each configured candidate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Exact equality.
    Match,
    DoesNotMatch,
    /// Prefix.
    StartWith,
    DoesNotStartWith,
    /// Suffix.
    EndWith,
    DoesNotEndWith,
    /// Substring.
    Contain,
    DoesNotContain,
}

impl MatchKind {
    pub const ALL: [MatchKind; 8] = [
        MatchKind::Match,
        MatchKind::DoesNotMatch,
        MatchKind::StartWith,
        MatchKind::DoesNotStartWith,
        MatchKind::EndWith,
        MatchKind::DoesNotEndWith,
        MatchKind::Contain,
        MatchKind::DoesNotContain,
    ];

    pub fn is_negated(self) -> bool {
        matches!(
            self,
            MatchKind::DoesNotMatch
                | MatchKind::DoesNotStartWith
                | MatchKind::DoesNotEndWith
                | MatchKind::DoesNotContain
        )
    }

    /// The non-negated form of this kind.
    pub fn positive(self) -> MatchKind {
        match self {
            MatchKind::Match | MatchKind::DoesNotMatch => MatchKind::Match,
            MatchKind::StartWith | MatchKind::DoesNotStartWith => MatchKind::StartWith,
            MatchKind::EndWith | MatchKind::DoesNotEndWith => MatchKind::EndWith,
            MatchKind::Contain | MatchKind::DoesNotContain => MatchKind::Contain,
        }
    }

    /// The negated form of this kind.
    pub fn negated(self) -> MatchKind {
        match self.positive() {
            MatchKind::Match => MatchKind::DoesNotMatch,
            MatchKind::StartWith => MatchKind::DoesNotStartWith,
            MatchKind::EndWith => MatchKind::DoesNotEndWith,
            _ => MatchKind::DoesNotContain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Match => "match",
            MatchKind::DoesNotMatch => "does_not_match",
            MatchKind::StartWith => "start_with",
            MatchKind::DoesNotStartWith => "does_not_start_with",
            MatchKind::EndWith => "end_with",
            MatchKind::DoesNotEndWith => "does_not_end_with",
            MatchKind::Contain => "contain",
            MatchKind::DoesNotContain => "does_not_contain",
        }
    }

    fn test_positive(self, value: &str, candidate: &str) -> bool {
        match self.positive() {
            MatchKind::Match => value == candidate,
            MatchKind::StartWith => value.starts_with(candidate),
            MatchKind::EndWith => value.ends_with(candidate),
            _ => value.contains(candidate),
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMatchKind(s.to_string()))
    }
}

/// Value being matched: a single attribute or a multi-valued one (e.g. tags).
#[derive(Debug, Copy, Clone)]
pub enum Subject<'a> {
    One(&'a str),
    Many(&'a [String]),
}

/// Compare `subject` against `candidates` using `kind`.
///
/// True when any subject value satisfies the positive check against any
/// candidate; negated kinds invert that aggregate result.
pub fn partial_match(kind: MatchKind, subject: Subject<'_>, candidates: &[String]) -> bool {
    let hit = match subject {
        Subject::One(value) => candidates
            .iter()
            .any(|candidate| kind.test_positive(value, candidate)),
        Subject::Many(values) => candidates.iter().any(|candidate| {
            values
                .iter()
                .any(|value| kind.test_positive(value, candidate))
        }),
    };
    hit != kind.is_negated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn single_subject_kinds() {
        let candidates = names(&["priority", "shipping"]);
        let subject = Subject::One("priority shipping");

        assert!(!partial_match(MatchKind::Match, subject, &candidates));
        assert!(partial_match(MatchKind::StartWith, subject, &candidates));
        assert!(partial_match(MatchKind::EndWith, subject, &candidates));
        assert!(partial_match(MatchKind::Contain, subject, &candidates));
        assert!(partial_match(MatchKind::DoesNotMatch, subject, &candidates));
        assert!(!partial_match(MatchKind::DoesNotContain, subject, &candidates));
    }

    #[test]
    fn multi_valued_subject_is_existential() {
        let tags = names(&["sale", "winter-gear"]);
        let subject = Subject::Many(&tags);

        assert!(partial_match(MatchKind::Match, subject, &names(&["sale"])));
        assert!(partial_match(MatchKind::StartWith, subject, &names(&["winter"])));
        assert!(!partial_match(MatchKind::EndWith, subject, &names(&["summer"])));
        // "no pairing contains" rather than "some pairing does not contain"
        assert!(!partial_match(
            MatchKind::DoesNotContain,
            subject,
            &names(&["gear", "nothing-like-it"])
        ));
    }

    #[test]
    fn empty_inputs_never_match_positively() {
        let none: Vec<String> = Vec::new();
        assert!(!partial_match(MatchKind::Contain, Subject::One("x"), &none));
        assert!(partial_match(MatchKind::DoesNotContain, Subject::One("x"), &none));
        assert!(!partial_match(MatchKind::Match, Subject::Many(&none), &names(&["x"])));
    }

    #[test]
    fn parses_every_kind_by_name() {
        for kind in MatchKind::ALL {
            assert_eq!(kind.as_str().parse::<MatchKind>().unwrap(), kind);
        }
        assert_eq!(
            "resembles".parse::<MatchKind>().unwrap_err(),
            ConfigError::UnknownMatchKind("resembles".to_string())
        );
    }

    #[test]
    fn negated_and_positive_are_inverse() {
        for kind in MatchKind::ALL {
            assert_eq!(kind.negated().positive(), kind.positive());
            assert!(kind.negated().is_negated());
            assert!(!kind.positive().is_negated());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: does_not_X(s, c) == !X(s, c) for every kind, for single and
        /// multi-valued subjects.
        #[test]
        fn negation_inverts_aggregate(
            subject in "[a-c]{0,4}",
            tags in prop::collection::vec("[a-c]{0,3}", 0..4),
            candidates in prop::collection::vec("[a-c]{0,3}", 0..4)
        ) {
            for kind in MatchKind::ALL.into_iter().filter(|k| !k.is_negated()) {
                prop_assert_eq!(
                    partial_match(kind.negated(), Subject::One(&subject), &candidates),
                    !partial_match(kind, Subject::One(&subject), &candidates)
                );
                prop_assert_eq!(
                    partial_match(kind.negated(), Subject::Many(&tags), &candidates),
                    !partial_match(kind, Subject::Many(&tags), &candidates)
                );
            }
        }
    }
}
