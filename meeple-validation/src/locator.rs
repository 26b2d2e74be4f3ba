// Field locators: where a value lives in an incoming request

use std::fmt;

/// Request segment a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSource {
    /// JSON request body
    Body,
    /// Path parameter
    Path,
    /// Query-string parameter
    Query,
}

impl FieldSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Path => "path",
            Self::Query => "query",
        }
    }
}

/// Identifies a single payload field by name and segment.
///
/// One locator is created per constraint chain at declaration time and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLocator {
    pub source: FieldSource,
    pub name: String,
}

impl FieldLocator {
    pub fn new(source: FieldSource, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
        }
    }

    /// Locator for a body field
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(FieldSource::Body, name)
    }

    /// Locator for a path parameter
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(FieldSource::Path, name)
    }

    /// Locator for a query parameter
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(FieldSource::Query, name)
    }
}

impl fmt::Display for FieldLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source.as_str(), self.name)
    }
}
