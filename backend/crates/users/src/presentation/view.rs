//! View Rendering
//!
//! Templates are rendered by whatever sits behind [`ViewRenderer`]. The
//! default renderer returns the template name and model as JSON, which is
//! what API clients and the tests consume.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, model: Value) -> Response;
}

/// Renders `{"template": ..., "model": ...}`
#[derive(Debug, Default, Clone)]
pub struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, template: &str, model: Value) -> Response {
        Json(json!({ "template": template, "model": model })).into_response()
    }
}
