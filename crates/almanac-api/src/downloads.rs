use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::state::AppState;

const GUIDE_FILE: &str = "test.pptx";
const TEMPLATE_FILE: &str = "test.xlsx";

/// GET /download: usage guide slides.
pub async fn download_guide(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    attachment(
        &state,
        GUIDE_FILE,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    )
    .await
}

/// GET /download1: spreadsheet template for imports.
pub async fn download_template(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    attachment(
        &state,
        TEMPLATE_FILE,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    )
    .await
}

async fn attachment(
    state: &AppState,
    name: &'static str,
    content_type: &'static str,
) -> Result<Response, StatusCode> {
    let file_path = state.downloads_dir.join(name);
    let bytes = tokio::fs::read(&file_path).await.map_err(|e| {
        error!("Failed to read {}: {}", file_path.display(), e);
        StatusCode::NOT_FOUND
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        bytes,
    )
        .into_response())
}
