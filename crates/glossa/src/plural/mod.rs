//! Selection of pluralized variants.
//!
//! A pluralized line holds `|`-separated variants. A variant may carry an
//! explicit condition:
//!
//! ```text
//! {0} No apples|{1} One apple|[2,*] {count} apples
//! {1,3,5} odd|]5,Inf[ lots
//! ```
//!
//! `{a,b,...}` matches exact values, `[a,b]` is an inclusive range and a
//! reversed bracket (`]a` or `b[`) excludes that end; `*`, `Inf` and `-Inf`
//! leave an end open. Variants without a condition are chosen by the
//! locale's plural rule. When a line has exactly one more bare variant than
//! the rule has forms, the first one is the zero variant, so in English
//! `none|one|many` picks `none` for 0.

mod rules;

use std::sync::LazyLock;

use regex::Regex;

pub use rules::PluralRule;

/// `{...}` or `[...]`/`]...[` condition prefix followed by the variant text.
#[allow(clippy::expect_used)]
static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([\{\[\]])([^\[\]\{\}]*)([\}\]\[])\s?(.*)$").expect("valid regex literal")
});

/// Chooses the variant of a pluralized line for a count.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageSelector;

impl MessageSelector {
    /// Select the variant of `line` for `count` under `locale`'s rules.
    ///
    /// Lines without `|` are returned unchanged.
    pub fn choose(line: &str, count: i64, locale: &str) -> String {
        if !line.contains('|') {
            return line.to_string();
        }

        let segments: Vec<&str> = line.split('|').collect();

        if let Some(value) = segments.iter().find_map(|s| matching_condition(s, count)) {
            return value.trim().to_string();
        }

        let bare: Vec<&str> = segments.iter().map(|s| strip_condition(s)).collect();
        let rule = PluralRule::for_locale(locale);

        let index = if bare.len() == rule.forms() + 1 {
            if count == 0 { 0 } else { rule.index(count) + 1 }
        } else {
            rule.index(count)
        };

        bare.get(index)
            .or_else(|| bare.first())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

/// An explicit variant condition.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Exact(Vec<f64>),
    Interval {
        low: f64,
        high: f64,
        low_inclusive: bool,
        high_inclusive: bool,
    },
}

impl Condition {
    fn matches(&self, n: f64) -> bool {
        match self {
            Condition::Exact(values) => values.contains(&n),
            Condition::Interval {
                low,
                high,
                low_inclusive,
                high_inclusive,
            } => {
                let above = if *low_inclusive { n >= *low } else { n > *low };
                let below = if *high_inclusive { n <= *high } else { n < *high };
                above && below
            }
        }
    }
}

/// Split a segment into its condition and variant text.
///
/// Braces whose content is not numeric (such as a `{count}` placeholder)
/// are not conditions.
fn parse_segment(segment: &str) -> Option<(Condition, &str)> {
    let caps = CONDITION.captures(segment)?;
    let open = caps.get(1)?.as_str();
    let body = caps.get(2)?.as_str();
    let close = caps.get(3)?.as_str();
    let value = caps.get(4)?.as_str();

    let condition = match (open, close) {
        ("{", "}") => {
            let values = body
                .split(',')
                .map(|v| parse_bound(v.trim()))
                .collect::<Option<Vec<_>>>()?;
            Condition::Exact(values)
        }
        ("[" | "]", "]" | "[") => {
            let (from, to) = body.split_once(',')?;
            Condition::Interval {
                low: parse_bound(from.trim())?,
                high: parse_bound(to.trim())?,
                low_inclusive: open == "[",
                high_inclusive: close == "]",
            }
        }
        _ => return None,
    };

    Some((condition, value))
}

/// The variant text when the segment's condition matches `count`.
fn matching_condition(segment: &str, count: i64) -> Option<&str> {
    let (condition, value) = parse_segment(segment)?;
    condition.matches(count as f64).then_some(value)
}

fn parse_bound(value: &str) -> Option<f64> {
    match value {
        "*" | "Inf" | "+Inf" | "inf" => Some(f64::INFINITY),
        "-Inf" | "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

/// Drop a leading condition, keeping the variant text.
fn strip_condition(segment: &str) -> &str {
    match parse_segment(segment) {
        Some((_, value)) => value,
        None => segment,
    }
}
