use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use validator::{Validate, ValidationErrors};

use crate::errors::{AppError, AppResult, FieldError};

/// ValidatedJson
///
/// JSON body extractor that runs the payload's `Validate` rules before the
/// handler sees it. Malformed JSON and rule violations both answer 400; the
/// latter carries one `FieldError` per failed rule.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        validate(&value)?;
        Ok(ValidatedJson(value))
    }
}

/// Runs the payload's rules and converts failures into the API error shape.
pub fn validate<T: Validate>(value: &T) -> AppResult<()> {
    value
        .validate()
        .map_err(|errors| AppError::Validation(field_errors(&errors)))
}

pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

// --- serde helpers shared by the request payloads ---

/// Trims surrounding whitespace so length rules apply to the visible text.
pub fn trimmed<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(|s| s.trim().to_string())
}

pub fn trimmed_opt<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(|o| o.map(|s| s.trim().to_string()))
}

/// `null`, `""` and whitespace all mean "not provided".
pub fn blank_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(|o| {
        o.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
