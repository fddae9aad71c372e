use thiserror::Error;

/// Terms rejected by the default policy.
pub const DEFAULT_DENY_TERMS: &[&str] = &["hate", "threat", "violence"];

#[derive(Debug, Error)]
#[error("Input contains prohibited language.")]
pub struct PolicyViolation {
    pub term: String,
}

/// Content check consulted by the submission pipeline before anything is stored.
pub trait ContentPolicy: Send + Sync {
    fn check(&self, text: &str) -> Result<(), PolicyViolation>;
}

/// Case-insensitive substring deny-list.
///
/// Deliberately blunt: the text is only lower-cased, not tokenized, so
/// "Whatever" trips on "hate" and "Threatened" on "threat".
#[derive(Debug, Clone)]
pub struct DenyList {
    terms: Vec<String>,
}

impl DenyList {
    /// Builds a list from arbitrary terms. Blank entries are dropped; an
    /// empty result falls back to [`DEFAULT_DENY_TERMS`].
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if terms.is_empty() {
            Self::default()
        } else {
            Self { terms }
        }
    }

    /// Parses a comma separated list, e.g. from configuration.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self {
            terms: DEFAULT_DENY_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ContentPolicy for DenyList {
    fn check(&self, text: &str) -> Result<(), PolicyViolation> {
        let lowered = text.to_lowercase();
        match self.terms.iter().find(|term| lowered.contains(term.as_str())) {
            Some(term) => Err(PolicyViolation { term: term.clone() }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_terms_any_case() {
        let policy = DenyList::default();
        for name in ["hate", "HATE", "I Hate This", "Threat Level", "ViOlEnCe"] {
            let err = policy.check(name).unwrap_err();
            assert_eq!(err.to_string(), "Input contains prohibited language.");
        }
    }

    #[test]
    fn substring_false_positives_are_rejected() {
        let policy = DenyList::default();
        assert_eq!(policy.check("Whatever Smith").unwrap_err().term, "hate");
        assert_eq!(policy.check("Threatt").unwrap_err().term, "threat");
        assert_eq!(policy.check("Nonviolence Jones").unwrap_err().term, "violence");
    }

    #[test]
    fn clean_names_pass() {
        let policy = DenyList::default();
        for name in ["Jane Doe", "Hat E", "Thr eat", "Ha", "José Núñez"] {
            assert!(policy.check(name).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn parse_overrides_and_falls_back() {
        let custom = DenyList::parse(" Spam , ,EGGS");
        assert_eq!(custom.terms(), ["spam", "eggs"]);
        assert!(custom.check("spammer").is_err());
        assert!(custom.check("I hate eggs").is_err());
        assert!(custom.check("hate").is_ok());

        let fallback = DenyList::parse(" , ");
        assert_eq!(fallback.terms(), DEFAULT_DENY_TERMS);
    }
}
