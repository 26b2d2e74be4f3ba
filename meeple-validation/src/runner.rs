// Validation runner: one interpreter loop over declared constraint chains

use crate::chain::{CheckKind, ConstraintChain, RuleSet, StepKind, TransformKind};
use crate::errors::{CheckError, ValidationError, ValidationErrors};
use crate::request::ValidationRequest;
use crate::validators;
use serde_json::Value;
use tracing::{debug, error};

/// Outcome of running every declared chain against one request
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every constraint held; transforms have been written back
    Valid,
    /// At least one constraint failed; errors follow declaration order
    Invalid(ValidationErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Valid => None,
            Self::Invalid(errors) => Some(errors),
        }
    }
}

/// Run every chain in `rules` against `request`.
///
/// Every field's chain is evaluated regardless of earlier fields' outcomes, so
/// one response can report several simultaneous errors. Failures never
/// propagate as faults; the caller decides what to do with an `Invalid`.
pub fn run_validation(request: &mut ValidationRequest, rules: &RuleSet) -> ValidationResult {
    let mut errors = ValidationErrors::default();

    for chain in &rules.chains {
        evaluate_chain(chain, request, &mut errors);
    }

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        let fields: Vec<&str> = errors.errors.iter().map(|e| e.field.as_str()).collect();
        debug!(count = errors.len(), fields = ?fields, "request rejected by validation rules");
        ValidationResult::Invalid(errors)
    }
}

enum Verdict {
    Pass,
    /// Failed; use the step's declared message
    Fail,
    /// Failed with a message supplied by the check itself
    FailWith(String),
    /// The check itself misbehaved; detail is operator-facing
    Fault(String),
}

fn evaluate_chain(
    chain: &ConstraintChain,
    request: &mut ValidationRequest,
    errors: &mut ValidationErrors,
) {
    let raw = request.get(&chain.locator).cloned();
    let present = matches!(&raw, Some(v) if !v.is_null());

    // optional() short-circuits the whole chain when the raw value is absent
    if chain.optional && !present {
        return;
    }

    let field = chain.locator.name.clone();
    let mut value = raw.unwrap_or(Value::Null);

    for step in &chain.steps {
        match &step.kind {
            StepKind::Transform(kind) => {
                if let Some(next) = apply_transform(kind, &value) {
                    value = next;
                }
            }
            StepKind::Check(kind) => {
                let verdict = run_check(kind, &value, request);
                let failed = !matches!(&verdict, Verdict::Pass);
                match verdict {
                    Verdict::Pass => {}
                    Verdict::Fail => {
                        errors.push(
                            ValidationError::new(&field, &step.message)
                                .with_constraint(kind.tag()),
                        );
                    }
                    Verdict::FailWith(message) => {
                        errors.push(
                            ValidationError::new(&field, message).with_constraint(kind.tag()),
                        );
                    }
                    Verdict::Fault(detail) => {
                        error!(
                            field = %chain.locator,
                            detail = %detail,
                            "custom check raised an internal fault"
                        );
                        errors.push(
                            ValidationError::new(&field, "Invalid value.")
                                .with_constraint(kind.tag()),
                        );
                    }
                }
                if failed && step.bail {
                    break;
                }
            }
        }
    }

    // Sanitized values only exist downstream for fields that arrived at all
    if present {
        request.set(&chain.locator, value);
    }
}

fn run_check(kind: &CheckKind, value: &Value, request: &ValidationRequest) -> Verdict {
    let pass = match kind {
        CheckKind::NotEmpty => match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        },
        CheckKind::IsArray => value.is_array(),
        CheckKind::IsBoolean => match value {
            Value::Bool(_) => true,
            Value::String(s) => s == "true" || s == "false",
            _ => false,
        },
        CheckKind::IsUuid => value.as_str().is_some_and(validators::is_uuid),
        CheckKind::IsEmail => value.as_str().is_some_and(validators::is_email),
        CheckKind::IsUrl => value.as_str().is_some_and(validators::is_url),
        CheckKind::IsIso8601 => value.as_str().is_some_and(validators::is_iso8601),
        CheckKind::IsInt { min, max } => match integer_value(value) {
            Some(n) => min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m),
            None => false,
        },
        CheckKind::IsIn(allowed) => value
            .as_str()
            .is_some_and(|s| allowed.iter().any(|a| a == s)),
        CheckKind::IsLength { min, max } => match value.as_str() {
            Some(s) => {
                let len = s.chars().count();
                min.is_none_or(|m| len >= m) && max.is_none_or(|m| len <= m)
            }
            None => false,
        },
        CheckKind::Matches(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
        CheckKind::Custom(check) => {
            return match check(value, request) {
                Ok(()) => Verdict::Pass,
                Err(CheckError::Invalid(message)) => Verdict::FailWith(message),
                Err(CheckError::Internal(detail)) => Verdict::Fault(detail),
            };
        }
    };

    if pass { Verdict::Pass } else { Verdict::Fail }
}

/// Transforms are best-effort: `None` leaves the value untouched when the
/// transform does not apply to its runtime shape.
fn apply_transform(kind: &TransformKind, value: &Value) -> Option<Value> {
    match kind {
        TransformKind::Trim => value.as_str().map(|s| Value::String(s.trim().to_string())),
        TransformKind::ToLowerCase => value.as_str().map(|s| Value::String(s.to_lowercase())),
        TransformKind::Escape => value
            .as_str()
            .map(|s| Value::String(validators::escape_html(s))),
        TransformKind::ToBoolean => match value {
            Value::Bool(_) => None,
            Value::String(s) => Some(Value::Bool(s == "true" || s == "1")),
            _ => None,
        },
        TransformKind::ToInt => match value {
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        TransformKind::ToDate => value
            .as_str()
            .and_then(validators::parse_iso8601_utc)
            .map(Value::String),
        TransformKind::Sanitize(sanitizer) => Some(sanitizer(value.clone())),
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ConstraintChain;
    use crate::errors::CheckError;
    use crate::locator::{FieldLocator, FieldSource};
    use crate::request::payload;
    use serde_json::json;

    fn run(request: &mut ValidationRequest, rules: &RuleSet) -> ValidationResult {
        run_validation(request, rules)
    }

    #[test]
    fn test_empty_rule_set_is_always_valid() {
        let rules = RuleSet::new();
        let mut request = payload(vec![("anything", json!("goes"))]);
        assert!(run(&mut request, &rules).is_valid());
    }

    #[test]
    fn test_missing_required_field_fails_not_empty() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("username")
                .not_empty()
                .message("Username is required."),
        );
        let mut request = ValidationRequest::new();

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].field, "username");
        assert_eq!(errors.errors[0].message, "Username is required.");
    }

    #[test]
    fn test_optional_absent_field_skips_whole_chain() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("isAdmin")
                .optional()
                .is_boolean()
                .to_boolean(),
        );
        let mut request = ValidationRequest::new();
        assert!(run(&mut request, &rules).is_valid());

        // JSON null counts as absent too
        let mut request = payload(vec![("isAdmin", Value::Null)]);
        assert!(run(&mut request, &rules).is_valid());
    }

    #[test]
    fn test_optional_present_field_still_validated() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("isAdmin")
                .optional()
                .is_boolean()
                .message("isAdmin must be a boolean."),
        );
        let mut request = payload(vec![("isAdmin", json!(7))]);

        let result = run(&mut request, &rules);
        assert_eq!(result.errors().unwrap().len(), 1);
    }

    #[test]
    fn test_transform_visible_to_later_checks() {
        // trim must run before the emptiness check sees the value
        let rules = RuleSet::new().field(
            ConstraintChain::body("name")
                .trim()
                .not_empty()
                .message("Name is required."),
        );
        let mut request = payload(vec![("name", json!("  "))]);

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "Name is required.");
    }

    #[test]
    fn test_all_failing_constraints_collected_in_order() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("code")
                .is_length(Some(10), None)
                .message("too short")
                .matches(regex::Regex::new(r"^[A-Z]+$").unwrap())
                .message("not upper case")
                .is_in(["ALPHA", "BETA"])
                .message("unknown code"),
        );
        let mut request = payload(vec![("code", json!("abc"))]);

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.errors[0].message, "too short");
        assert_eq!(errors.errors[1].message, "not upper case");
        assert_eq!(errors.errors[2].message, "unknown code");
    }

    #[test]
    fn test_matches_requires_full_string_match() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("code")
                .matches(regex::Regex::new("abc").unwrap())
                .message("bad code"),
        );

        // a substring hit is not enough
        let mut request = payload(vec![("code", json!("xx-abc-xx"))]);
        let result = run(&mut request, &rules);
        assert_eq!(result.errors().unwrap().len(), 1);

        let mut request = payload(vec![("code", json!("abc"))]);
        assert!(run(&mut request, &rules).is_valid());
    }

    #[test]
    fn test_bail_stops_chain_after_failure() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("id")
                .is_uuid()
                .message("bad id")
                .bail()
                .is_length(Some(36), Some(36))
                .message("unreached"),
        );
        let mut request = payload(vec![("id", json!("nope"))]);

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "bad id");
    }

    #[test]
    fn test_every_field_evaluated_despite_earlier_failures() {
        let rules = RuleSet::new()
            .field(ConstraintChain::body("username").not_empty().message("no username"))
            .field(ConstraintChain::body("password").not_empty().message("no password"));
        let mut request = ValidationRequest::new();

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors[0].field, "username");
        assert_eq!(errors.errors[1].field, "password");
    }

    #[test]
    fn test_cross_field_custom_check_attribution() {
        let rules = RuleSet::new()
            .field(ConstraintChain::body("password").not_empty())
            .field(ConstraintChain::body("confirmPassword").custom(|value, request| {
                let password = request.get(&FieldLocator::body("password"));
                if password == Some(value) {
                    Ok(())
                } else {
                    Err(CheckError::invalid("Passwords do not match."))
                }
            }));
        let mut request = payload(vec![
            ("password", json!("Abc12345!")),
            ("confirmPassword", json!("different")),
        ]);

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].field, "confirmPassword");
        assert_eq!(errors.errors[0].message, "Passwords do not match.");
    }

    #[test]
    fn test_custom_internal_fault_becomes_generic_failure() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("score").custom(|_, _| {
                Err(CheckError::internal("lookup table unavailable"))
            }),
        );
        let mut request = payload(vec![("score", json!(10))]);

        let result = run(&mut request, &rules);
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "Invalid value.");
        assert_eq!(errors.errors[0].constraint, "custom");
    }

    #[test]
    fn test_transforms_written_back_for_present_fields() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("email")
                .trim()
                .to_lowercase()
                .is_email(),
        );
        let mut request = payload(vec![("email", json!("  Sam@Example.COM "))]);

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(
            request.get(&FieldLocator::body("email")),
            Some(&json!("sam@example.com"))
        );
    }

    #[test]
    fn test_absent_field_not_materialized_by_write_back() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("isAdmin").optional().to_boolean(),
        );
        let mut request = ValidationRequest::new();

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(request.get(&FieldLocator::body("isAdmin")), None);
    }

    #[test]
    fn test_to_boolean_coercion() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("isAdmin").is_boolean().to_boolean(),
        );
        let mut request = payload(vec![("isAdmin", json!("true"))]);

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(request.get(&FieldLocator::body("isAdmin")), Some(&json!(true)));
    }

    #[test]
    fn test_to_int_coercion_and_bounds() {
        let rules = RuleSet::new().field(
            ConstraintChain::query("limit")
                .is_int(Some(1), Some(100))
                .to_int(),
        );
        let mut request = ValidationRequest::new();
        request.insert(FieldSource::Query, "limit", json!("25"));

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(request.get(&FieldLocator::query("limit")), Some(&json!(25)));

        let mut request = ValidationRequest::new();
        request.insert(FieldSource::Query, "limit", json!("250"));
        assert!(!run(&mut request, &rules).is_valid());
    }

    #[test]
    fn test_int_bounds_inclusive() {
        let rules = RuleSet::new()
            .field(ConstraintChain::body("players").is_int(Some(2), Some(64)));

        for value in [json!(2), json!(64)] {
            let mut request = payload(vec![("players", value)]);
            assert!(run(&mut request, &rules).is_valid());
        }
        for value in [json!(1), json!(65), json!(2.5), json!("abc")] {
            let mut request = payload(vec![("players", value)]);
            assert!(!run(&mut request, &rules).is_valid());
        }
    }

    #[test]
    fn test_to_date_normalizes_to_utc() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("date").is_iso8601().to_date(),
        );
        let mut request = payload(vec![("date", json!("2026-09-12T19:30:00+02:00"))]);

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(
            request.get(&FieldLocator::body("date")),
            Some(&json!("2026-09-12T17:30:00+00:00"))
        );
    }

    #[test]
    fn test_escape_transform() {
        let rules = RuleSet::new().field(ConstraintChain::body("bio").escape());
        let mut request = payload(vec![("bio", json!("I <3 dice & meeples"))]);

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(
            request.get(&FieldLocator::body("bio")),
            Some(&json!("I &lt;3 dice &amp; meeples"))
        );
    }

    #[test]
    fn test_custom_sanitizer() {
        let rules = RuleSet::new().field(ConstraintChain::body("tag").sanitize(|v| {
            match v {
                Value::String(s) => Value::String(s.replace(' ', "-")),
                other => other,
            }
        }));
        let mut request = payload(vec![("tag", json!("worker placement"))]);

        assert!(run(&mut request, &rules).is_valid());
        assert_eq!(
            request.get(&FieldLocator::body("tag")),
            Some(&json!("worker-placement"))
        );
    }

    #[test]
    fn test_shape_checks_fail_on_missing_value() {
        let rules = RuleSet::new().field(
            ConstraintChain::body("tags").is_array().message("Tags must be an array."),
        );
        let mut request = ValidationRequest::new();

        let result = run(&mut request, &rules);
        assert_eq!(result.errors().unwrap().len(), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let rules = RuleSet::new()
            .field(ConstraintChain::body("username").trim().is_length(Some(3), Some(20)))
            .field(ConstraintChain::body("email").optional().is_email());
        let original = payload(vec![("username", json!("ab")), ("email", json!("nope"))]);

        let mut first = original.clone();
        let mut second = original.clone();
        let result_a = run(&mut first, &rules);
        let result_b = run(&mut second, &rules);

        assert_eq!(result_a, result_b);
        assert_eq!(first, second);
    }
}
