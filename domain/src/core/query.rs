//! Query value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A user query submitted to the relay (Value Object)
///
/// The backend rejects blank queries, so a `Query` is only constructible
/// from text with at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a query, rejecting empty or whitespace-only text
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        Ok(Self { content })
    }

    /// Get the query text
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

impl TryFrom<String> for Query {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Query::try_new(value)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.content
    }
}
