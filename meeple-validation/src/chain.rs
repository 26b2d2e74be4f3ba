// Constraint chains: ordered descriptor records built by a fluent builder
//
// A chain is plain data. Nothing here evaluates anything; the runner owns the
// single interpreter loop that walks these descriptors.

use crate::errors::CheckError;
use crate::locator::FieldLocator;
use crate::request::ValidationRequest;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Custom predicate over the field value and the whole payload.
pub type CustomCheck =
    Arc<dyn Fn(&Value, &ValidationRequest) -> Result<(), CheckError> + Send + Sync>;

/// Custom value rewrite; never fails.
pub type CustomSanitizer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Predicate checks understood by the interpreter
#[derive(Clone)]
pub(crate) enum CheckKind {
    NotEmpty,
    IsArray,
    IsBoolean,
    IsUuid,
    IsEmail,
    IsUrl,
    IsIso8601,
    IsInt { min: Option<i64>, max: Option<i64> },
    IsIn(Vec<String>),
    IsLength { min: Option<usize>, max: Option<usize> },
    Matches(Regex),
    Custom(CustomCheck),
}

impl CheckKind {
    /// Constraint tag used in error records and diagnostics
    pub(crate) fn tag(&self) -> &'static str {
        match self {
            Self::NotEmpty => "notEmpty",
            Self::IsArray => "isArray",
            Self::IsBoolean => "isBoolean",
            Self::IsUuid => "isUUID",
            Self::IsEmail => "isEmail",
            Self::IsUrl => "isURL",
            Self::IsIso8601 => "isISO8601",
            Self::IsInt { .. } => "isInt",
            Self::IsIn(_) => "isIn",
            Self::IsLength { .. } => "isLength",
            Self::Matches(_) => "matches",
            Self::Custom(_) => "custom",
        }
    }

    fn default_message(&self, field: &str) -> String {
        match self {
            Self::NotEmpty => format!("{} should not be empty", field),
            Self::IsArray => format!("{} must be an array", field),
            Self::IsBoolean => format!("{} must be a boolean", field),
            Self::IsUuid => format!("{} must be a valid UUID", field),
            Self::IsEmail => format!("{} must be a valid email", field),
            Self::IsUrl => format!("{} must be a valid URL", field),
            Self::IsIso8601 => format!("{} must be a valid ISO 8601 date", field),
            Self::IsInt { .. } => format!("{} must be an integer", field),
            Self::IsIn(_) => format!("{} must be one of the allowed values", field),
            Self::IsLength { .. } => format!("{} has an invalid length", field),
            Self::Matches(_) => format!("{} does not match required pattern", field),
            Self::Custom(_) => "Invalid value.".to_string(),
        }
    }
}

/// Value rewrites understood by the interpreter; transforms never fail
#[derive(Clone)]
pub(crate) enum TransformKind {
    Trim,
    ToLowerCase,
    Escape,
    ToBoolean,
    ToInt,
    ToDate,
    Sanitize(CustomSanitizer),
}

#[derive(Clone)]
pub(crate) enum StepKind {
    Check(CheckKind),
    Transform(TransformKind),
}

/// One declared constraint step
#[derive(Clone)]
pub(crate) struct Step {
    pub(crate) kind: StepKind,
    /// Caller-facing message when a check fails; empty for transforms
    pub(crate) message: String,
    /// Terminal marker: a failing check with `bail` stops its chain
    pub(crate) bail: bool,
}

/// Ordered constraint sequence for one field.
///
/// Built once at startup, immutable afterwards, and shared freely across
/// concurrent requests.
#[derive(Clone)]
pub struct ConstraintChain {
    pub(crate) locator: FieldLocator,
    pub(crate) optional: bool,
    pub(crate) steps: Vec<Step>,
}

impl ConstraintChain {
    pub fn new(locator: FieldLocator) -> Self {
        Self {
            locator,
            optional: false,
            steps: Vec::new(),
        }
    }

    /// Chain over a body field
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(FieldLocator::body(name))
    }

    /// Chain over a path parameter
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(FieldLocator::path(name))
    }

    /// Chain over a query parameter
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(FieldLocator::query(name))
    }

    /// Skip the whole chain when the raw value is absent
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Override the message of the most recently declared check
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(step) = self
            .steps
            .iter_mut()
            .rev()
            .find(|s| matches!(s.kind, StepKind::Check(_)))
        {
            step.message = message.into();
        }
        self
    }

    /// Mark the most recently declared check as terminal: if it fails, the
    /// rest of the chain is not evaluated
    pub fn bail(mut self) -> Self {
        if let Some(step) = self
            .steps
            .iter_mut()
            .rev()
            .find(|s| matches!(s.kind, StepKind::Check(_)))
        {
            step.bail = true;
        }
        self
    }

    fn check(mut self, kind: CheckKind) -> Self {
        let message = kind.default_message(&self.locator.name);
        self.steps.push(Step {
            kind: StepKind::Check(kind),
            message,
            bail: false,
        });
        self
    }

    fn transform(mut self, kind: TransformKind) -> Self {
        self.steps.push(Step {
            kind: StepKind::Transform(kind),
            message: String::new(),
            bail: false,
        });
        self
    }

    // Checks

    /// Fails on missing values, null, and whitespace-only strings
    pub fn not_empty(self) -> Self {
        self.check(CheckKind::NotEmpty)
    }

    pub fn is_array(self) -> Self {
        self.check(CheckKind::IsArray)
    }

    /// Accepts JSON booleans and the strings "true"/"false"
    pub fn is_boolean(self) -> Self {
        self.check(CheckKind::IsBoolean)
    }

    pub fn is_uuid(self) -> Self {
        self.check(CheckKind::IsUuid)
    }

    pub fn is_email(self) -> Self {
        self.check(CheckKind::IsEmail)
    }

    pub fn is_url(self) -> Self {
        self.check(CheckKind::IsUrl)
    }

    pub fn is_iso8601(self) -> Self {
        self.check(CheckKind::IsIso8601)
    }

    /// Integer check with inclusive bounds; accepts JSON integers and
    /// integer-valued strings
    pub fn is_int(self, min: Option<i64>, max: Option<i64>) -> Self {
        self.check(CheckKind::IsInt { min, max })
    }

    pub fn is_in<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        self.check(CheckKind::IsIn(allowed))
    }

    /// String length check with inclusive bounds, counted in characters
    pub fn is_length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.check(CheckKind::IsLength { min, max })
    }

    /// Pattern check; the regex is fixed at declaration time and the value
    /// must match it in full, not merely contain a match
    pub fn matches(self, pattern: Regex) -> Self {
        // wrapping a valid pattern in an anchored group always recompiles
        let anchored = Regex::new(&format!("^(?:{})$", pattern.as_str())).unwrap_or(pattern);
        self.check(CheckKind::Matches(anchored))
    }

    /// Custom predicate; the failure message travels in [`CheckError::Invalid`]
    pub fn custom<F>(self, check: F) -> Self
    where
        F: Fn(&Value, &ValidationRequest) -> Result<(), CheckError> + Send + Sync + 'static,
    {
        self.check(CheckKind::Custom(Arc::new(check)))
    }

    // Transforms

    pub fn trim(self) -> Self {
        self.transform(TransformKind::Trim)
    }

    pub fn to_lowercase(self) -> Self {
        self.transform(TransformKind::ToLowerCase)
    }

    /// HTML-escape the value for safe rendering downstream
    pub fn escape(self) -> Self {
        self.transform(TransformKind::Escape)
    }

    pub fn to_boolean(self) -> Self {
        self.transform(TransformKind::ToBoolean)
    }

    pub fn to_int(self) -> Self {
        self.transform(TransformKind::ToInt)
    }

    /// Normalize an ISO 8601 string to a canonical UTC timestamp
    pub fn to_date(self) -> Self {
        self.transform(TransformKind::ToDate)
    }

    pub fn sanitize<F>(self, sanitizer: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform(TransformKind::Sanitize(Arc::new(sanitizer)))
    }

    pub fn locator(&self) -> &FieldLocator {
        &self.locator
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The full ordered set of constraint chains declared for one endpoint.
///
/// Built by a factory at startup and passed to the runner per call; there is
/// no process-wide registry.
#[derive(Clone, Default)]
pub struct RuleSet {
    pub(crate) chains: Vec<ConstraintChain>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { chains: Vec::new() }
    }

    /// Append a chain; evaluation follows declaration order
    pub fn field(mut self, chain: ConstraintChain) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
