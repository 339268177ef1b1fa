use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{AppError, FieldError};

/// Explicit input checks run after deserialization. May normalize fields in place.
pub trait Validate {
    fn validate(&mut self) -> Result<(), Vec<FieldError>>;
}

/// JSON body that has been both parsed and validated.
/// Parse failures and failed checks both surface as `AppError::Validation`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(vec![body_error(&rejection)]))?;
        value.validate().map_err(AppError::Validation)?;
        Ok(ValidJson(value))
    }
}

fn body_error(rejection: &JsonRejection) -> FieldError {
    FieldError::new("body", rejection.body_text())
}
