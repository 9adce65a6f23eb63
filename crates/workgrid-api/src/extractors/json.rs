//! JSON body extractor that runs `validator` rules before the handler sees the value.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use workgrid_core::error::AppError;

use crate::error::ApiError;

/// A deserialized and validated JSON body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation_failed(vec![rejection.body_text()]))?;
        value
            .validate()
            .map_err(|errors| AppError::validation_failed(field_messages(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

/// Flattens validator output into sorted `field: message` strings.
pub fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let text = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", err.code));
                format!("{}: {}", camel_case(&field), text)
            })
        })
        .collect();
    messages.sort();
    messages
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "is required"))]
        full_name: String,
    }

    #[test]
    fn test_field_messages_use_wire_names() {
        let errors = Sample {
            full_name: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_messages(&errors), vec!["fullName: is required".to_string()]);
    }
}
