//! The HTTP server.
//!
//! One interesting route: `POST /upload_ingredients` takes a multipart form
//! with an `ingredients` file field and responds with rendered HTML. The
//! upload form itself is static HTML served from `www/`.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse, Response},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    annotation::paragraph_texts,
    error::ScanError,
    extract::extract_ingredients,
    ocr::OcrEngine,
    prelude::*,
    render,
};

/// Directory holding the static upload form.
const WWW_DIR: &str = "www";

/// Label photos are big. Allow a bit more than axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// State shared across requests: just the injected OCR engine handle.
#[derive(Clone)]
struct AppState {
    engine: Arc<dyn OcrEngine>,
}

/// Build our application router.
fn app(engine: Arc<dyn OcrEngine>) -> Router {
    Router::new()
        .route("/upload_ingredients", post(upload_ingredients))
        .fallback_service(ServeDir::new(WWW_DIR))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

/// Serve the application until the process is stopped.
pub async fn serve(addr: SocketAddr, engine: Arc<dyn OcrEngine>) -> Result<()> {
    let app = app(engine);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("App listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Handler for `POST /upload_ingredients`.
#[instrument(level = "debug", skip_all)]
async fn upload_ingredients(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let image = match read_ingredients_field(&mut multipart).await {
        Ok(image) => image,
        Err(err) => return err.into_response(),
    };
    match handle_upload(state.engine.as_ref(), image).await {
        Ok(html) => Html(html).into_response(),
        // An empty form is the user's mistake, not ours.
        Err(err @ ScanError::MissingUpload) => err.into_response(),
        Err(err) => {
            error!("failed to scan upload: {err}");
            err.into_response()
        }
    }
}

/// Pull the `ingredients` file field out of the multipart form, if present.
async fn read_ingredients_field(
    multipart: &mut Multipart,
) -> Result<Option<Bytes>, ScanError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ScanError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        if field.name() == Some("ingredients") {
            let bytes = field.bytes().await.map_err(|err| {
                ScanError::BadRequest(format!("failed to read upload: {err}"))
            })?;
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}

/// The whole pipeline for one upload: OCR, flatten, extract, render.
///
/// Split out from the handler so tests can drive it with a canned engine.
async fn handle_upload(
    engine: &dyn OcrEngine,
    image: Option<Bytes>,
) -> Result<String, ScanError> {
    let Some(image) = image else {
        return Err(ScanError::MissingUpload);
    };

    let annotation = engine.detect_document_text(&image).await?;
    if let Some(text) = &annotation.text {
        debug!(%text, "OCR transcript");
    }

    let paragraphs = paragraph_texts(&annotation);
    let ingredients = extract_ingredients(&paragraphs);
    Ok(render::ingredients_page(&ingredients))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{annotation::TextAnnotation, ocr::testing::FixedOcrEngine};

    use super::*;

    /// Build a one-paragraph annotation from the given words.
    fn annotation(words: &[&str]) -> TextAnnotation {
        let words = words
            .iter()
            .map(|word| {
                let symbols = word
                    .chars()
                    .map(|c| json!({ "text": c.to_string() }))
                    .collect::<Vec<_>>();
                json!({ "symbols": symbols })
            })
            .collect::<Vec<_>>();
        serde_json::from_value(json!({
            "pages": [{ "blocks": [{ "paragraphs": [{ "words": words }] }] }]
        }))
        .expect("failed to build test annotation")
    }

    #[tokio::test]
    async fn upload_runs_the_full_pipeline() {
        let engine =
            FixedOcrEngine::new(annotation(&["INGREDIENTS:", "Sugar,", "Salt,", "Water."]));
        let html = handle_upload(&engine, Some(Bytes::from_static(b"fake png")))
            .await
            .unwrap();
        assert_eq!(
            html,
            "<b>INGREDIENTS</b><br>\n<ul>\n<li>sugar</li>\n<li>salt</li>\n<li>water</li>\n</ul>\n"
        );
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn label_without_ingredient_list_renders_empty_list() {
        let engine = FixedOcrEngine::new(annotation(&["Nutrition", "Facts"]));
        let html = handle_upload(&engine, Some(Bytes::from_static(b"fake png")))
            .await
            .unwrap();
        assert_eq!(html, "<b>INGREDIENTS</b><br>\n<ul>\n</ul>\n");
    }

    #[tokio::test]
    async fn missing_upload_never_reaches_ocr() {
        let engine = FixedOcrEngine::new(annotation(&["unused"]));
        let err = handle_upload(&engine, None).await.unwrap_err();
        assert!(matches!(err, ScanError::MissingUpload));
        assert_eq!(err.to_string(), "No files were uploaded.");
        assert_eq!(engine.call_count(), 0);
    }
}
