use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that must pass its `validator` rules before reaching the handler.
///
/// Field errors are returned under `details` with status 400.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct SubmitContact {
///     #[validate(length(min = 10))]
///     message: String,
/// }
///
/// async fn submit(ValidatedJson(input): ValidatedJson<SubmitContact>) { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
