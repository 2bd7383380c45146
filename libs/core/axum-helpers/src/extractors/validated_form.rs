//! Form extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    Form,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// `application/x-www-form-urlencoded` body extractor with automatic validation.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedForm;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct DeleteForm {
///     #[validate(required, length(min = 1))]
///     id: Option<String>,
/// }
///
/// async fn delete(ValidatedForm(form): ValidatedForm<DeleteForm>) -> String {
///     format!("deleting {:?}", form.id)
/// }
///
/// let app = Router::new().route("/delete", post(delete));
/// ```
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(data) = Form::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedForm(data))
    }
}
