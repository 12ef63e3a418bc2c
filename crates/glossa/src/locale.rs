//! Locale fallback chain.

/// Ordered, deduplicated list of locales to try for one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocaleChain(Vec<String>);

impl LocaleChain {
    /// Build the chain for a lookup.
    ///
    /// `[requested or default, fallback]`, dropping empty entries and
    /// duplicates. The fallback is only appended when `use_fallback` is set.
    pub fn resolve(
        requested: Option<&str>,
        default: &str,
        fallback: Option<&str>,
        use_fallback: bool,
    ) -> Self {
        let primary = requested.filter(|l| !l.trim().is_empty()).unwrap_or(default);

        let mut candidates = vec![primary];
        if use_fallback {
            candidates.extend(fallback);
        }

        let mut chain: Vec<String> = Vec::with_capacity(candidates.len());
        for locale in candidates {
            let locale = locale.trim();
            if locale.is_empty() || chain.iter().any(|l| l == locale) {
                continue;
            }
            chain.push(locale.to_string());
        }

        Self(chain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The locale tried first, if any.
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}
