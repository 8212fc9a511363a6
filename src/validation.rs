/// Declarative validation for the review dialog.
/// Every rule runs on each pass so the form can show all field errors at once.
use std::collections::BTreeMap;
use std::fmt;

use leptos::logging::{error, warn};
use serde::Deserialize;
use serde_valid::Validate;
use thiserror::Error;

use crate::models::review::ReviewDraft;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Form fields, in the order they are laid out in the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Rating,
    Review,
    Name,
    Email,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Rating, Field::Review, Field::Name, Field::Email];

    fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.noun() == key)
    }

    fn noun(self) -> &'static str {
        match self {
            Field::Rating => "rating",
            Field::Review => "review",
            Field::Name => "name",
            Field::Email => "email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Rating => "Rating",
            Field::Review => "Review",
            Field::Name => "Name",
            Field::Email => "Email",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    MissingField(Field),
    #[error("{field} must be greater than or equal to {min}")]
    BelowMinimum { field: Field, min: u8 },
    #[error("That is not an {}", .0.noun())]
    InvalidFormat(Field),
}

/// Field errors from one validation pass, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }

    fn insert(&mut self, field: Field, error: FieldError) {
        self.errors.insert(field, error);
    }
}

// Rule codes carried as serde_valid messages and mapped back onto `FieldError`.
const MISSING: &str = "missing";
const BELOW_MINIMUM: &str = "below_minimum";
const INVALID_FORMAT: &str = "invalid_format";

/// The review schema. An absent rating is validated as 0 so the minimum
/// rule doubles as the required check.
#[derive(Debug, Validate)]
struct ReviewSchema {
    #[validate(min_length = 1, message = "missing")]
    name: String,
    #[validate(minimum = 1, message = "below_minimum")]
    rating: u8,
    #[validate(min_length = 1, message = "missing")]
    review: String,
    // HTML "valid e-mail address" grammar.
    #[validate(min_length = 1, message = "missing")]
    #[validate(
        pattern = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        message = "invalid_format"
    )]
    email: String,
}

impl From<&ReviewDraft> for ReviewSchema {
    fn from(draft: &ReviewDraft) -> Self {
        Self {
            name: draft.name.clone(),
            rating: draft.rating_value(),
            review: draft.review.clone(),
            email: draft.email.clone(),
        }
    }
}

/// Shape of the serde_valid error report: `{"errors": [], "properties": {"name": {"errors": [...]}}}`.
#[derive(Debug, Default, Deserialize)]
struct SchemaReport {
    #[serde(default)]
    properties: BTreeMap<String, PropertyReport>,
}

#[derive(Debug, Default, Deserialize)]
struct PropertyReport {
    #[serde(default)]
    errors: Vec<String>,
}

impl ValidationErrors {
    fn from_report(report: SchemaReport) -> Self {
        let mut errors = ValidationErrors::default();
        for (key, property) in report.properties {
            let Some(field) = Field::from_key(&key) else {
                warn!("[VALIDATION] Unknown field in schema report: {}", key);
                continue;
            };
            let has = |code: &str| property.errors.iter().any(|e| e == code);

            // An empty email also fails the pattern; report it as missing.
            let error = if has(MISSING) {
                FieldError::MissingField(field)
            } else if has(BELOW_MINIMUM) {
                FieldError::BelowMinimum { field, min: MIN_RATING }
            } else if has(INVALID_FORMAT) {
                FieldError::InvalidFormat(field)
            } else {
                continue;
            };
            errors.insert(field, error);
        }
        errors
    }
}

/// Runs the review schema against a draft.
pub fn validate(draft: &ReviewDraft) -> Result<(), ValidationErrors> {
    let Err(report) = ReviewSchema::from(draft).validate() else {
        return Ok(());
    };

    match serde_json::from_str::<SchemaReport>(&report.to_string()) {
        Ok(report) => Err(ValidationErrors::from_report(report)),
        Err(e) => {
            // Still blocks the submit, just without per-field messages.
            error!("[VALIDATION] Unreadable schema report {}: {}", report, e);
            Err(ValidationErrors::default())
        }
    }
}
