//! Request extractors that reject with the API error envelope instead of
//! axum's plain-text defaults.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON body; malformed or mistyped payloads become `VALIDATION_ERROR`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; unparsable ids become `VALIDATION_ERROR` on `id`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
