//! Session domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Prefix carried by every client-generated session identifier.
pub const SESSION_ID_PREFIX: &str = "s_";

/// Identifier of one logical conversation (Value Object)
///
/// Generated client-side, persisted across restarts and replaced when the
/// user starts a new conversation. The server treats it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier: `s_` followed by 32 hex characters.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            SESSION_ID_PREFIX,
            uuid::Uuid::new_v4().simple()
        ))
    }

    /// Parse a previously persisted identifier.
    ///
    /// The id ends up in URL paths, so only ASCII alphanumerics, `_` and `-`
    /// are accepted after the prefix.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        match raw.strip_prefix(SESSION_ID_PREFIX) {
            Some(rest) if !rest.is_empty() && rest.chars().all(is_id_char) => {
                Ok(Self(raw.to_string()))
            }
            _ => Err(DomainError::InvalidSessionId(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing four characters, used when showing the session to the user.
    pub fn short(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.0[start..]
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SessionId::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Role of a message in a stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Any role the history service reports that the client does not know.
    Other,
}

impl Role {
    /// Map a wire role string; unknown roles become [`Role::Other`].
    pub fn from_wire(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "system" => Role::System,
            "user" | "human" => Role::User,
            "assistant" | "ai" | "bot" => Role::Assistant,
            _ => Role::Other,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_and_parses_back() {
        let id = SessionId::generate();
        assert!(id.as_str().starts_with("s_"));
        assert_eq!(id.as_str().len(), 2 + 32);
        assert_eq!(SessionId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("s_").is_err());
        assert!(SessionId::parse("abc123").is_err());
        assert!(SessionId::parse("s_ab cd").is_err());
    }

    #[test]
    fn parse_rejects_url_significant_characters() {
        for raw in ["s_../admin", "s_a/b", "s_a?limit=1", "s_a#frag", "s_a%2F", "s_é"] {
            assert!(SessionId::parse(raw).is_err(), "{raw} should be rejected");
        }
        assert!(SessionId::parse("s_old-format_42").is_ok());
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let id = SessionId::parse("  s_abc123\n").unwrap();
        assert_eq!(id.as_str(), "s_abc123");
    }

    #[test]
    fn short_is_trailing_four_chars() {
        let id = SessionId::parse("s_0123456789abcdef").unwrap();
        assert_eq!(id.short(), "cdef");
        let tiny = SessionId::parse("s_x").unwrap();
        assert_eq!(tiny.short(), "s_x");
    }

    #[test]
    fn role_from_wire() {
        assert_eq!(Role::from_wire("user"), Role::User);
        assert_eq!(Role::from_wire("Assistant"), Role::Assistant);
        assert_eq!(Role::from_wire("tool"), Role::Other);
        assert!(Role::from_wire("human").is_user());
    }
}
