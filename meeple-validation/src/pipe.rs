// Validation pipe: translates engine results at the HTTP boundary

use crate::chain::RuleSet;
use crate::errors::ValidationErrors;
use crate::request::ValidationRequest;
use crate::runner::{ValidationResult, run_validation};
use meeple_core::{Error, HttpRequest, HttpResponse};
use tracing::warn;

/// Runs a rule set against an HTTP request before the real handler sees it.
///
/// On success the request's body and params are rewritten with sanitized
/// values; on failure the caller gets the response to send instead of
/// invoking the handler.
pub struct ValidationPipe;

impl ValidationPipe {
    /// Validate `req` against `rules`, writing sanitized values back on success.
    pub fn validate(req: &mut HttpRequest, rules: &RuleSet) -> Result<(), HttpResponse> {
        let mut request = ValidationRequest::from_http(req).map_err(Self::error_response)?;

        match run_validation(&mut request, rules) {
            ValidationResult::Valid => {
                request.apply_to(req).map_err(Self::error_response)?;
                Ok(())
            }
            ValidationResult::Invalid(errors) => {
                warn!(
                    method = %req.method,
                    path = %req.path,
                    count = errors.len(),
                    "rejecting request with validation errors"
                );
                Err(Self::rejection(&errors))
            }
        }
    }

    /// The uniform HTTP 422 rejection for a set of validation errors
    pub fn rejection(errors: &ValidationErrors) -> HttpResponse {
        match HttpResponse::unprocessable_entity().with_json(&errors.to_json()) {
            Ok(response) => response,
            Err(err) => Self::error_response(err),
        }
    }

    fn error_response(err: Error) -> HttpResponse {
        let body = serde_json::json!({ "message": err.to_string() });
        HttpResponse::new(err.status_code())
            .with_json(&body)
            .unwrap_or_else(|_| HttpResponse::new(err.status_code()))
    }
}
