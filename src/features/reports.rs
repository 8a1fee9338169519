use axum::{extract::State, routing::get};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::json::WebJson;
use crate::api::middleware::CurrentUser;
use crate::api::routes::Blueprint;
use crate::app::AppState;
use crate::features::SectionPage;

#[derive(Debug, Serialize)]
pub struct ReportsBody {
    /// Largest report upload accepted, in bytes
    pub upload_limit: usize,
}

pub fn blueprint() -> Blueprint {
    Blueprint::new("reports").route("/", "index", get(index))
}

/// GET /reports
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<WebJson<SectionPage<ReportsBody>>, ApiError> {
    let body = ReportsBody {
        upload_limit: state.config.max_content_length,
    };
    Ok(WebJson(SectionPage::new("reports", &current, &state.filters, body)?))
}
