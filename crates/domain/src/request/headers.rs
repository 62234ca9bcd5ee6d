//! Request header collection

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

/// A single HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Accept")
    pub name: String,
    /// The header value
    pub value: String,
}

impl Header {
    /// Creates a header after checking the name is a valid token.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidHeaderName` for empty names or names
    /// containing whitespace, separators or control characters.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if !valid {
            return Err(DomainError::InvalidHeaderName(name));
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }
}

/// Ordered header list with case-insensitive lookup.
///
/// Setting a header replaces any existing header with the same name, so a
/// request never carries two `Authorization` values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts or replaces a header.
    pub fn set(&mut self, header: Header) {
        self.remove(&header.name);
        self.items.push(header);
    }

    /// Removes every header matching `name`, ignoring case.
    pub fn remove(&mut self, name: &str) {
        self.items.retain(|h| !h.name.eq_ignore_ascii_case(name));
    }

    /// Returns the value of the header matching `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        let mut headers = Self::new();
        for header in iter {
            headers.set(header);
        }
        headers
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.set(Header::new("authorization", "Bearer old").unwrap());
        headers.set(Header::new(AUTHORIZATION, "Bearer new").unwrap());

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer new"));
    }

    #[test]
    fn test_invalid_header_names() {
        assert!(Header::new("", "x").is_err());
        assert!(Header::new("X Bad", "x").is_err());
        assert!(Header::new("X-Good_1", "x").is_ok());
    }

    #[test]
    fn test_remove() {
        let mut headers: Headers = [Header::new("Accept", "*/*").unwrap()]
            .into_iter()
            .collect();
        headers.remove("accept");
        assert!(headers.is_empty());
    }
}
