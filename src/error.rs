//! The service-wide error type.
//!
//! Every failure in the upload pipeline converts to an HTML response here;
//! none of them should ever take down the serving process.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::render::error_page;

/// An error while scanning an uploaded label.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The upload form had no `ingredients` file field.
    #[error("No files were uploaded.")]
    MissingUpload,

    /// The request body itself couldn't be read as a multipart form.
    #[error("invalid upload: {0}")]
    BadRequest(String),

    /// The OCR service returned an annotation we couldn't make sense of.
    #[error("malformed text annotation: {0}")]
    InvalidAnnotation(String),

    /// The OCR call itself failed (network, quota, auth, ...).
    #[error("OCR service failure: {0}")]
    OcrServiceFailure(String),
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        match self {
            // Plain text, matching the upload form contract.
            ScanError::MissingUpload => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ScanError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Html(error_page(&message))).into_response()
            }
            // Upstream details are logged, not shown to the user.
            ScanError::InvalidAnnotation(_) | ScanError::OcrServiceFailure(_) => (
                StatusCode::BAD_GATEWAY,
                Html(error_page(
                    "An error occurred while scanning the label. Please try again.",
                )),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_upload_maps_to_400_with_plain_message() {
        let response = ScanError::MissingUpload.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ocr_failures_map_to_error_pages() {
        let response =
            ScanError::OcrServiceFailure("quota exceeded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response =
            ScanError::InvalidAnnotation("missing pages".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
