// Mutable in-memory view of an incoming payload's fields

use crate::locator::{FieldLocator, FieldSource};
use meeple_core::{Error, HttpRequest};
use serde_json::{Map, Value};

/// The three request segments the engine reads from and writes back to.
///
/// Each call owns its own instance; declared rule sets never touch shared
/// state, so concurrent requests validate independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRequest {
    body: Map<String, Value>,
    path: Map<String, Value>,
    query: Map<String, Value>,
}

impl ValidationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the payload view from an HTTP request.
    ///
    /// An empty body maps to an empty object; anything that is not a JSON
    /// object is rejected before validation starts.
    pub fn from_http(req: &HttpRequest) -> Result<Self, Error> {
        let body = if req.body.is_empty() {
            Map::new()
        } else {
            let parsed: Value = serde_json::from_slice(&req.body)
                .map_err(|e| Error::BadRequest(format!("invalid JSON body: {}", e)))?;
            match parsed {
                Value::Object(map) => map,
                _ => {
                    return Err(Error::BadRequest(
                        "request body must be a JSON object".to_string(),
                    ));
                }
            }
        };

        let mut path = Map::new();
        for (name, value) in &req.path_params {
            path.insert(name.clone(), Value::String(value.clone()));
        }

        let mut query = Map::new();
        for (name, value) in &req.query_params {
            query.insert(name.clone(), Value::String(value.clone()));
        }

        Ok(Self { body, path, query })
    }

    fn segment(&self, source: FieldSource) -> &Map<String, Value> {
        match source {
            FieldSource::Body => &self.body,
            FieldSource::Path => &self.path,
            FieldSource::Query => &self.query,
        }
    }

    fn segment_mut(&mut self, source: FieldSource) -> &mut Map<String, Value> {
        match source {
            FieldSource::Body => &mut self.body,
            FieldSource::Path => &mut self.path,
            FieldSource::Query => &mut self.query,
        }
    }

    /// Read the raw value a locator points at
    pub fn get(&self, locator: &FieldLocator) -> Option<&Value> {
        self.segment(locator.source).get(&locator.name)
    }

    /// Write a (possibly sanitized) value back into its segment
    pub fn set(&mut self, locator: &FieldLocator, value: Value) {
        self.segment_mut(locator.source)
            .insert(locator.name.clone(), value);
    }

    /// Insert a field directly; used by tests and non-HTTP callers
    pub fn insert(
        &mut self,
        source: FieldSource,
        name: impl Into<String>,
        value: Value,
    ) -> &mut Self {
        self.segment_mut(source).insert(name.into(), value);
        self
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn path_params(&self) -> &Map<String, Value> {
        &self.path
    }

    pub fn query_params(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Copy sanitized values back onto the HTTP request so downstream
    /// handlers observe trimmed/escaped/coerced fields.
    pub fn apply_to(&self, req: &mut HttpRequest) -> Result<(), Error> {
        req.body = serde_json::to_vec(&Value::Object(self.body.clone()))
            .map_err(|e| Error::Serialization(e.to_string()))?;

        for (name, value) in &self.path {
            req.path_params.insert(name.clone(), stringify(value));
        }
        for (name, value) in &self.query {
            req.query_params.insert(name.clone(), stringify(value));
        }
        Ok(())
    }
}

/// Param maps are string-typed on the wire; coerced values round-trip as
/// their JSON rendering without surrounding quotes.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convenience builder for tests and direct callers
pub fn payload(fields: Vec<(&str, Value)>) -> ValidationRequest {
    let mut request = ValidationRequest::new();
    for (name, value) in fields {
        request.insert(FieldSource::Body, name, value);
    }
    request
}
