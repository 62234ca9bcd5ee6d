//! Methods issued against the admin backend

use std::fmt;

/// HTTP method of an [`ApiRequest`](super::ApiRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// Read a resource
    #[default]
    Get,
    /// Create, or call an action endpoint such as login
    Post,
    /// Replace a resource
    Put,
    /// Partially update a resource
    Patch,
    /// Remove a resource
    Delete,
}

impl HttpMethod {
    /// True for methods whose JSON body is sent on the wire. A body set on
    /// a GET or DELETE request is kept for replay but never transmitted.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
