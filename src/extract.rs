use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejection is reported through the standard error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
