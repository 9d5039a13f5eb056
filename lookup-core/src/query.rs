use std::fmt;

use crate::error::LookupError;

/// Country qualifier appended to queries that don't name one.
pub const DEFAULT_COUNTRY: &str = "us";

/// A trimmed, non-empty and normalized location query.
///
/// Construct it with [`LocationQuery::parse`]; the provider only accepts this type,
/// so an empty query can never reach the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn parse(input: &str) -> Result<Self, LookupError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LookupError::InvalidInput);
        }

        Ok(Self(normalize_query(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append the default country when the query carries no `,` qualifier.
///
/// Ambiguous city names are therefore resolved against US matches first.
pub fn normalize_query(query: &str) -> String {
    if query.contains(',') {
        query.to_string()
    } else {
        format!("{query},{DEFAULT_COUNTRY}")
    }
}
