//! Cardinal plural rules per language.
//!
//! Each rule maps a count to the index of the variant to use. Locales are
//! matched on their primary language subtag (`pt-BR` and `pt_BR` are the
//! one regional exception). Unknown languages use the English rule.

/// A language's cardinal plural rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// No plural distinction (ja, zh, ko, tr, ...).
    Invariant,
    /// one: n = 1 (en, de, nl, es, ...).
    OneOther,
    /// one: n = 0 or 1 (fr, pt-BR, hi, ...).
    ZeroOneOther,
    /// East Slavic and Serbo-Croatian: one, few, many.
    Slavic,
    /// Czech and Slovak: one, 2–4, other.
    CzechSlovak,
    /// Irish: one, two, other.
    Irish,
    /// Lithuanian: one, few, other.
    Lithuanian,
    /// Slovenian: n%100 = 1, 2, 3–4, other.
    Slovenian,
    /// Macedonian: n%10 = 1, other.
    Macedonian,
    /// Maltese: one, few, many, other.
    Maltese,
    /// Latvian: zero, one, other.
    Latvian,
    /// Polish: one, few, many.
    Polish,
    /// Welsh: one, two, eight/eleven, other.
    Welsh,
    /// Romanian: one, few, other.
    Romanian,
    /// Arabic: zero, one, two, few, many, other.
    Arabic,
}

impl PluralRule {
    /// Rule for a locale identifier such as `en`, `ru_RU` or `pt-BR`.
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.trim().replace('-', "_").to_lowercase();
        if normalized == "pt_br" {
            return Self::ZeroOneOther;
        }

        let language = normalized.split('_').next().unwrap_or_default();
        match language {
            "az" | "bo" | "dz" | "id" | "ja" | "jv" | "ka" | "km" | "kn" | "ko" | "ms" | "th"
            | "tr" | "vi" | "zh" => Self::Invariant,
            "am" | "bh" | "fil" | "fr" | "gun" | "hi" | "hy" | "ln" | "mg" | "nso" | "ti"
            | "wa" | "xbr" => Self::ZeroOneOther,
            "be" | "bs" | "hr" | "ru" | "sh" | "sr" | "uk" => Self::Slavic,
            "cs" | "sk" => Self::CzechSlovak,
            "ga" => Self::Irish,
            "lt" => Self::Lithuanian,
            "sl" => Self::Slovenian,
            "mk" => Self::Macedonian,
            "mt" => Self::Maltese,
            "lv" => Self::Latvian,
            "pl" => Self::Polish,
            "cy" => Self::Welsh,
            "ro" => Self::Romanian,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    /// Number of distinct variants the rule selects between.
    pub fn forms(self) -> usize {
        match self {
            Self::Invariant => 1,
            Self::OneOther | Self::ZeroOneOther | Self::Macedonian => 2,
            Self::Slavic
            | Self::CzechSlovak
            | Self::Irish
            | Self::Lithuanian
            | Self::Latvian
            | Self::Polish
            | Self::Romanian => 3,
            Self::Slovenian | Self::Maltese | Self::Welsh => 4,
            Self::Arabic => 6,
        }
    }

    /// Variant index for a count.
    pub fn index(self, count: i64) -> usize {
        let n = count.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;

        match self {
            Self::Invariant => 0,
            Self::OneOther => usize::from(n != 1),
            Self::ZeroOneOther => usize::from(n > 1),
            Self::Slavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && !(10..20).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Lithuanian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && !(10..20).contains(&n100) {
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
            Self::Macedonian => usize::from(n10 != 1),
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (2..=10).contains(&n100) {
                    1
                } else if (11..=19).contains(&n100) {
                    2
                } else {
                    3
                }
            }
            Self::Latvian => {
                if n == 0 {
                    0
                } else if n10 == 1 && n100 != 11 {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Welsh => match n {
                1 => 0,
                2 => 1,
                8 | 11 => 2,
                _ => 3,
            },
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..20).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if (3..=10).contains(&n100) => 3,
                _ if (11..=99).contains(&n100) => 4,
                _ => 5,
            },
        }
    }
}
