//! Custom extractors for Axum handlers.
//!
//! Both extractors decode the request and then run `validator::Validate`,
//! rejecting with [`AppError`](crate::errors::AppError) so failures share the
//! standard error body.

pub mod validated_form;
pub mod validated_query;

pub use validated_form::ValidatedForm;
pub use validated_query::ValidatedQuery;
