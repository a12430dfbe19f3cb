//! Plural form selection for numerus messages.
//!
//! Each locale maps to one [`PluralRule`]. A rule picks the index of the
//! `<numerusform>` variant for a count; variants in a catalog are ordered the
//! same way the rule orders its [`PluralCategory`] list.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

use crate::types::{
    normalize_locale,
    primary_language,
};

/// CLDR-style plural categories, used for display and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        })
    }
}

/// Count-to-form rules, grouped by the arithmetic they share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PluralRule {
    /// No plural distinction (Japanese, Chinese, Korean, ...).
    OneForm,
    /// `1` vs everything else.
    English,
    /// `0` and `1` vs everything else.
    French,
    Latvian,
    Icelandic,
    Irish,
    /// Czech and Slovak: `1`, `2..=4`, other.
    Czech,
    Macedonian,
    Lithuanian,
    /// East and South Slavic languages except Slovenian and Macedonian.
    Russian,
    Polish,
    Romanian,
    Slovenian,
    Maltese,
    Welsh,
    Arabic,
}

use PluralCategory::{
    Few,
    Many,
    One,
    Other,
    Two,
    Zero,
};

impl PluralRule {
    /// Rule used for locales missing from the table.
    pub const DEFAULT: Self = Self::English;

    /// Finds the rule for a locale identifier.
    ///
    /// `pt-BR`, `pt_BR` and `pt_br` are the same locale. The full tag is tried
    /// first, then the primary language subtag.
    #[must_use]
    pub fn for_locale(locale: &str) -> Option<Self> {
        let normalized = normalize_locale(locale);
        PLURAL_RULES
            .get(normalized.as_str())
            .or_else(|| PLURAL_RULES.get(primary_language(&normalized)))
            .copied()
    }

    /// Like [`PluralRule::for_locale`], falling back to [`PluralRule::DEFAULT`].
    #[must_use]
    pub fn for_locale_or_default(locale: &str) -> Self {
        Self::for_locale(locale).unwrap_or_else(|| {
            tracing::debug!(locale, "No plural rule for locale, using default");
            Self::DEFAULT
        })
    }

    /// Categories in form order; the variant at index `i` covers `categories()[i]`.
    #[must_use]
    pub const fn categories(self) -> &'static [PluralCategory] {
        match self {
            Self::OneForm => &[Other],
            Self::English | Self::French | Self::Icelandic => &[One, Other],
            Self::Latvian => &[One, Other, Zero],
            Self::Irish | Self::Macedonian => &[One, Two, Other],
            Self::Czech | Self::Lithuanian | Self::Romanian => &[One, Few, Other],
            Self::Russian | Self::Polish => &[One, Few, Many],
            Self::Slovenian => &[One, Two, Few, Other],
            Self::Maltese => &[One, Few, Many, Other],
            Self::Welsh => &[One, Two, Many, Other],
            Self::Arabic => &[Zero, One, Two, Few, Many, Other],
        }
    }

    /// Number of plural forms a catalog for this rule should carry.
    #[must_use]
    pub const fn form_count(self) -> usize {
        self.categories().len()
    }

    /// Index of the form to use for `n`. Always `< form_count()`.
    #[must_use]
    pub fn select(self, n: u64) -> usize {
        let n10 = n % 10;
        let n100 = n % 100;
        match self {
            Self::OneForm => 0,
            Self::English => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::Latvian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Icelandic => usize::from(n10 != 1 || n100 == 11),
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Macedonian => match n10 {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Lithuanian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && (n100 < 10 || n100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Russian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && (n100 < 10 || n100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && (n100 < 10 || n100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match n100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=10).contains(&n100) {
                    1
                } else if (11..=19).contains(&n100) {
                    2
                } else {
                    3
                }
            }
            Self::Welsh => match n {
                1 => 0,
                2 => 1,
                8 | 11 => 2,
                _ => 3,
            },
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if (3..=10).contains(&n100) => 3,
                _ if n100 >= 11 => 4,
                _ => 5,
            },
        }
    }

    /// Category selected for `n`.
    #[must_use]
    pub fn category(self, n: u64) -> PluralCategory {
        self.categories().get(self.select(n)).copied().unwrap_or(Other)
    }
}

/// Index of the plural form for `count` in `locale`.
///
/// Unknown locales use [`PluralRule::DEFAULT`].
#[must_use]
pub fn select_form(locale: &str, count: u64) -> usize {
    PluralRule::for_locale_or_default(locale).select(count)
}

/// Whether `locale` (or its primary language) has an entry in the rule table.
#[must_use]
pub fn is_known_locale(locale: &str) -> bool {
    PluralRule::for_locale(locale).is_some()
}

/// Locale -> rule table, keyed by normalized identifiers.
static PLURAL_RULES: LazyLock<HashMap<&'static str, PluralRule>> = LazyLock::new(|| {
    use PluralRule::{
        Arabic,
        Czech,
        English,
        French,
        Icelandic,
        Irish,
        Latvian,
        Lithuanian,
        Macedonian,
        Maltese,
        OneForm,
        Polish,
        Romanian,
        Russian,
        Slovenian,
        Welsh,
    };

    let groups: &[(PluralRule, &[&'static str])] = &[
        (
            OneForm,
            &[
                "bo", "dz", "fa", "hu", "id", "ja", "jv", "ka", "km", "ko", "lo", "ms", "my", "su",
                "th", "tr", "ug", "vi", "yo", "zh",
            ],
        ),
        (
            English,
            &[
                "af", "ast", "az", "bg", "bn", "ca", "da", "de", "el", "en", "eo", "es", "et",
                "eu", "fi", "fo", "fy", "gl", "gu", "ha", "he", "hi", "it", "kk", "kn", "ku",
                "ky", "lb", "ml", "mn", "mr", "nb", "ne", "nl", "nn", "no", "or", "pa", "ps",
                "pt", "rm", "si", "so", "sq", "sv", "sw", "ta", "te", "tk", "ur", "uz", "zu",
            ],
        ),
        (French, &["ak", "am", "bh", "fil", "fr", "gun", "hy", "ln", "mg", "nso", "oc", "pt_br", "ti", "tl", "wa"]),
        (Latvian, &["lv"]),
        (Icelandic, &["is"]),
        (Irish, &["ga"]),
        (Czech, &["cs", "sk"]),
        (Macedonian, &["mk"]),
        (Lithuanian, &["lt"]),
        (Russian, &["be", "bs", "hr", "ru", "sh", "sr", "uk"]),
        (Polish, &["pl"]),
        (Romanian, &["mo", "ro"]),
        (Slovenian, &["sl"]),
        (Maltese, &["mt"]),
        (Welsh, &["cy"]),
        (Arabic, &["ar"]),
    ];

    groups
        .iter()
        .flat_map(|(rule, locales)| locales.iter().map(move |locale| (*locale, *rule)))
        .collect()
});

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::one("en", 1, 0)]
    #[case::zero("en", 0, 1)]
    #[case::many("en", 5, 1)]
    #[case::french_zero("fr", 0, 0)]
    #[case::french_two("fr", 2, 1)]
    #[case::brazilian("pt-BR", 0, 0)]
    #[case::european_portuguese("pt_PT", 0, 1)]
    #[case::japanese("ja_JP", 7, 0)]
    #[case::traditional_chinese("zh_TW", 1, 0)]
    #[case::dutch("nl", 1, 0)]
    #[case::danish("da", 2, 1)]
    #[case::unknown_locale("xx", 1, 0)]
    #[case::unknown_locale_other("xx", 3, 1)]
    fn test_select_form(#[case] locale: &str, #[case] count: u64, #[case] expected: usize) {
        assert_that!(select_form(locale, count), eq(expected));
    }

    #[rstest]
    #[case::one(1, 0)]
    #[case::few(3, 1)]
    #[case::many(5, 2)]
    #[case::eleven(11, 2)]
    #[case::twenty_one(21, 0)]
    #[case::twenty_two(22, 1)]
    #[case::hundred_twelve(112, 2)]
    fn test_russian(#[case] count: u64, #[case] expected: usize) {
        assert_that!(PluralRule::Russian.select(count), eq(expected));
    }

    #[rstest]
    #[case::one(1, 0)]
    #[case::twenty_one(21, 2)]
    #[case::twenty_two(22, 1)]
    #[case::twelve(12, 2)]
    fn test_polish(#[case] count: u64, #[case] expected: usize) {
        assert_that!(PluralRule::Polish.select(count), eq(expected));
    }

    #[rstest]
    #[case::zero(0, 0)]
    #[case::one(1, 1)]
    #[case::two(2, 2)]
    #[case::few(103, 3)]
    #[case::many(111, 4)]
    #[case::hundred(100, 5)]
    fn test_arabic(#[case] count: u64, #[case] expected: usize) {
        assert_that!(PluralRule::Arabic.select(count), eq(expected));
        assert_that!(PluralRule::Arabic.category(count), eq(PluralRule::Arabic.categories()[expected]));
    }

    #[rstest]
    #[case(PluralRule::Latvian, &[(0, 2), (1, 0), (11, 1), (21, 0)])]
    #[case(PluralRule::Icelandic, &[(1, 0), (11, 1), (21, 0)])]
    #[case(PluralRule::Irish, &[(1, 0), (2, 1), (3, 2)])]
    #[case(PluralRule::Czech, &[(1, 0), (4, 1), (5, 2)])]
    #[case(PluralRule::Macedonian, &[(11, 0), (12, 1), (13, 2)])]
    #[case(PluralRule::Lithuanian, &[(1, 0), (2, 1), (12, 2), (10, 2)])]
    #[case(PluralRule::Romanian, &[(1, 0), (0, 1), (19, 1), (20, 2), (101, 1)])]
    #[case(PluralRule::Slovenian, &[(101, 0), (102, 1), (3, 2), (5, 3)])]
    #[case(PluralRule::Maltese, &[(1, 0), (0, 1), (10, 1), (11, 2), (20, 3)])]
    #[case(PluralRule::Welsh, &[(1, 0), (2, 1), (8, 2), (11, 2), (3, 3)])]
    fn test_rule_cases(#[case] rule: PluralRule, #[case] cases: &[(u64, usize)]) {
        for &(count, expected) in cases {
            assert_eq!(rule.select(count), expected, "{rule:?} n={count}");
        }
    }

    #[googletest::test]
    fn test_select_is_within_form_count() {
        let rules = [
            PluralRule::OneForm,
            PluralRule::English,
            PluralRule::French,
            PluralRule::Latvian,
            PluralRule::Icelandic,
            PluralRule::Irish,
            PluralRule::Czech,
            PluralRule::Macedonian,
            PluralRule::Lithuanian,
            PluralRule::Russian,
            PluralRule::Polish,
            PluralRule::Romanian,
            PluralRule::Slovenian,
            PluralRule::Maltese,
            PluralRule::Welsh,
            PluralRule::Arabic,
        ];
        for rule in rules {
            for n in (0..=250).chain([1_000, 1_000_001, u64::MAX]) {
                assert!(rule.select(n) < rule.form_count(), "{rule:?} n={n}");
            }
        }
    }

    #[googletest::test]
    fn test_for_locale() {
        expect_that!(PluralRule::for_locale("pt_BR"), some(eq(PluralRule::French)));
        expect_that!(PluralRule::for_locale("PT-br"), some(eq(PluralRule::French)));
        expect_that!(PluralRule::for_locale("pt"), some(eq(PluralRule::English)));
        expect_that!(PluralRule::for_locale("sr@latin"), some(eq(PluralRule::Russian)));
        expect_that!(PluralRule::for_locale("klingon"), none());
        expect_that!(PluralRule::for_locale_or_default("klingon"), eq(PluralRule::DEFAULT));
        expect_that!(is_known_locale("zh_TW"), eq(true));
        expect_that!(is_known_locale("qq"), eq(false));
    }

    #[googletest::test]
    fn test_categories() {
        assert_eq!(PluralRule::English.categories(), &[One, Other]);
        expect_that!(PluralRule::OneForm.form_count(), eq(1));
        expect_that!(PluralRule::Arabic.form_count(), eq(6));
        expect_that!(PluralRule::Russian.category(3), eq(Few));
        expect_that!(Many.to_string(), eq("many"));
    }
}
