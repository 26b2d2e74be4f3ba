//! Declarative request validation for meeple endpoints
//!
//! Constraint chains are plain data: each field gets an ordered list of
//! check/transform descriptors built by a fluent builder, and one interpreter
//! (the runner) walks every chain, collects every failing constraint, and
//! produces a single [`ValidationResult`]. Transforms (trim, escape,
//! coercions) rewrite the payload in place so handlers downstream observe
//! sanitized values.
//!
//! # Examples
//!
//! ```
//! use meeple_validation::{ConstraintChain, RuleSet, run_validation, payload};
//! use serde_json::json;
//!
//! let rules = RuleSet::new()
//!     .field(
//!         ConstraintChain::body("username")
//!             .trim()
//!             .not_empty()
//!             .message("Username is required.")
//!             .is_length(Some(3), Some(20))
//!             .message("Username must be between 3 and 20 characters."),
//!     )
//!     .field(ConstraintChain::body("email").optional().is_email());
//!
//! let mut request = payload(vec![("username", json!("  sam  "))]);
//! let result = run_validation(&mut request, &rules);
//! assert!(result.is_valid());
//! ```
//!
//! At the HTTP boundary, [`ValidationPipe`] turns an `Invalid` outcome into
//! the uniform 422 rejection envelope:
//!
//! ```
//! use meeple_core::HttpRequest;
//! use meeple_validation::{ValidationPipe, rulesets};
//!
//! let rules = rulesets::register_user();
//! let mut req = HttpRequest::new("POST", "/api/users/register")
//!     .with_body(br#"{"username":"ab","password":"short"}"#.to_vec());
//!
//! let response = ValidationPipe::validate(&mut req, &rules).unwrap_err();
//! assert_eq!(response.status, 422);
//! ```

mod chain;
mod errors;
mod locator;
mod pipe;
mod request;
mod runner;
mod validators;

pub mod rulesets;

pub use chain::{ConstraintChain, CustomCheck, CustomSanitizer, RuleSet};
pub use errors::{CheckError, REJECTION_MESSAGE, ValidationError, ValidationErrors};
pub use locator::{FieldLocator, FieldSource};
pub use pipe::ValidationPipe;
pub use request::{ValidationRequest, payload};
pub use runner::{ValidationResult, run_validation};
