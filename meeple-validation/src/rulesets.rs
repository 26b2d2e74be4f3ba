// Rule sets for the meeple API endpoints
//
// Each factory returns an immutable RuleSet value; callers hold them for the
// process lifetime and pass them to the runner per request. The rules here are
// configuration, not engine code.

use crate::chain::{ConstraintChain, RuleSet};
use crate::errors::CheckError;
use crate::locator::FieldLocator;
use crate::request::ValidationRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

/// Upper + lower + digit + special, checked per character class since the
/// regex crate has no lookahead.
fn password_strength(value: &Value, _request: &ValidationRequest) -> Result<(), CheckError> {
    let password = value.as_str().unwrap_or_default();
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(CheckError::invalid(
            "Password must contain an uppercase letter, a lowercase letter, a number, and a special character.",
        ))
    }
}

fn equals_field(other: FieldLocator, message: &'static str) -> impl Fn(&Value, &ValidationRequest) -> Result<(), CheckError> {
    move |value, request| {
        if request.get(&other) == Some(value) {
            Ok(())
        } else {
            Err(CheckError::invalid(message))
        }
    }
}

/// POST /api/users/register
pub fn register_user() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::body("username")
                .trim()
                .not_empty()
                .message("Username is required.")
                .is_length(Some(3), Some(20))
                .message("Username must be between 3 and 20 characters.")
                .matches(USERNAME_REGEX.clone())
                .message("Username may only contain letters, numbers, and underscores."),
        )
        .field(
            ConstraintChain::body("password")
                .is_length(Some(8), None)
                .message("Password must be at least 8 characters long.")
                .custom(password_strength),
        )
        .field(
            ConstraintChain::body("isAdmin")
                .optional()
                .is_boolean()
                .message("isAdmin must be a boolean.")
                .to_boolean(),
        )
}

/// POST /api/users/login
pub fn login() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::body("username")
                .trim()
                .not_empty()
                .message("Username is required."),
        )
        .field(
            ConstraintChain::body("password")
                .not_empty()
                .message("Password is required."),
        )
}

/// PUT /api/users/profile
pub fn update_profile() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::body("email")
                .optional()
                .trim()
                .to_lowercase()
                .is_email()
                .message("Please provide a valid email address."),
        )
        .field(
            ConstraintChain::body("displayName")
                .optional()
                .trim()
                .is_length(Some(1), Some(40))
                .message("Display name must be between 1 and 40 characters.")
                .escape(),
        )
        .field(
            ConstraintChain::body("bio")
                .optional()
                .trim()
                .is_length(None, Some(280))
                .message("Bio cannot be longer than 280 characters.")
                .escape(),
        )
        .field(
            ConstraintChain::body("avatarUrl")
                .optional()
                .trim()
                .is_url()
                .message("Avatar URL must be a valid URL."),
        )
}

/// PUT /api/users/password
pub fn change_password() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::body("currentPassword")
                .not_empty()
                .message("Current password is required."),
        )
        .field(
            ConstraintChain::body("newPassword")
                .is_length(Some(8), None)
                .message("Password must be at least 8 characters long.")
                .custom(password_strength)
                .custom(|value, request| {
                    if request.get(&FieldLocator::body("currentPassword")) == Some(value) {
                        Err(CheckError::invalid(
                            "New password must be different from your current password.",
                        ))
                    } else {
                        Ok(())
                    }
                }),
        )
        .field(ConstraintChain::body("confirmPassword").custom(equals_field(
            FieldLocator::body("newPassword"),
            "Passwords do not match.",
        )))
}

/// POST /api/events
pub fn create_event() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::body("title")
                .trim()
                .not_empty()
                .message("Event title is required.")
                .is_length(Some(3), Some(80))
                .message("Event title must be between 3 and 80 characters.")
                .escape(),
        )
        .field(
            ConstraintChain::body("date")
                .not_empty()
                .message("Event date is required.")
                .bail()
                .is_iso8601()
                .message("Event date must be a valid ISO 8601 date.")
                .to_date(),
        )
        .field(
            ConstraintChain::body("location")
                .optional()
                .trim()
                .is_length(None, Some(120))
                .message("Location cannot be longer than 120 characters.")
                .escape(),
        )
        .field(
            ConstraintChain::body("description")
                .optional()
                .trim()
                .is_length(None, Some(500))
                .message("Description cannot be longer than 500 characters.")
                .escape(),
        )
        .field(
            ConstraintChain::body("maxPlayers")
                .optional()
                .is_int(Some(2), Some(64))
                .message("maxPlayers must be an integer between 2 and 64.")
                .to_int(),
        )
}

/// GET /api/events
pub fn list_events() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::query("page")
                .optional()
                .is_int(Some(1), None)
                .message("page must be a positive integer.")
                .to_int(),
        )
        .field(
            ConstraintChain::query("limit")
                .optional()
                .is_int(Some(1), Some(100))
                .message("limit must be an integer between 1 and 100.")
                .to_int(),
        )
        .field(
            ConstraintChain::query("upcoming")
                .optional()
                .is_boolean()
                .message("upcoming must be true or false.")
                .to_boolean(),
        )
}

/// GET /api/users/:id
pub fn get_user() -> RuleSet {
    RuleSet::new().field(
        ConstraintChain::path("id")
            .is_uuid()
            .message("User id must be a valid UUID."),
    )
}

/// POST /api/friends/requests
pub fn friend_request() -> RuleSet {
    RuleSet::new().field(
        ConstraintChain::body("friendId")
            .not_empty()
            .message("friendId is required.")
            .bail()
            .is_uuid()
            .message("friendId must be a valid UUID."),
    )
}

/// POST /api/games
pub fn add_game() -> RuleSet {
    RuleSet::new()
        .field(
            ConstraintChain::body("name")
                .trim()
                .not_empty()
                .message("Game name is required.")
                .is_length(Some(1), Some(100))
                .message("Game name must be between 1 and 100 characters.")
                .escape(),
        )
        .field(
            ConstraintChain::body("minPlayers")
                .is_int(Some(1), None)
                .message("minPlayers must be a positive integer.")
                .to_int(),
        )
        .field(
            ConstraintChain::body("maxPlayers")
                .is_int(Some(1), None)
                .message("maxPlayers must be a positive integer.")
                .to_int()
                .custom(|value, request| {
                    let max = value.as_i64();
                    let min = request
                        .get(&FieldLocator::body("minPlayers"))
                        .and_then(Value::as_i64);
                    match (min, max) {
                        (Some(min), Some(max)) if max < min => Err(CheckError::invalid(
                            "maxPlayers cannot be less than minPlayers.",
                        )),
                        _ => Ok(()),
                    }
                }),
        )
        .field(
            ConstraintChain::body("genre")
                .optional()
                .is_in(["strategy", "party", "coop", "deckbuilder", "dexterity", "trivia"])
                .message("Genre must be one of: strategy, party, coop, deckbuilder, dexterity, trivia."),
        )
        .field(
            ConstraintChain::body("tags")
                .optional()
                .is_array()
                .message("Tags must be an array."),
        )
}
