use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Opaque token scoping requests and cache keys to one browser session.
///
/// Supplied by the surrounding page; never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Scope used by the onboarding pages, which poll without a wallet session.
    pub const ANONYMOUS: &'static str = "anonymous";

    /// Session ids end up inside storage keys, so `_` (the key separator)
    /// and whitespace are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::InvalidSession("session id cannot be empty".into()));
        }
        if value.contains('_') || value.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidSession(value));
        }
        Ok(Self(value))
    }

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ids_that_would_break_cache_keys() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("a_b").is_err());
        assert!(SessionId::new("a b").is_err());
        let id = SessionId::new("3f2a9c").unwrap();
        assert_eq!(id.value(), "3f2a9c");
        assert_eq!(id.to_string(), "3f2a9c");
        assert!(!id.is_anonymous());
        assert!(SessionId::anonymous().is_anonymous());
    }
}
