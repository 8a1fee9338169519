use axum::{extract::State, routing::get};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::json::WebJson;
use crate::api::middleware::CurrentUser;
use crate::api::routes::Blueprint;
use crate::app::AppState;
use crate::features::SectionPage;

const SECTIONS: [&str; 4] = ["reports.index", "problems.index", "stats.index", "dumpdirs.index"];

#[derive(Debug, Serialize)]
pub struct SummaryBody {
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct Link {
    pub endpoint: &'static str,
    pub url: String,
}

pub fn blueprint() -> Blueprint {
    Blueprint::new("summary").route("/", "index", get(index))
}

/// Landing page with links to the other sections
///
/// GET /summary
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<WebJson<SectionPage<SummaryBody>>, ApiError> {
    let links = SECTIONS
        .iter()
        .copied()
        .filter_map(|endpoint| {
            state.urls.url_for(endpoint).map(|url| Link {
                endpoint,
                url: url.to_string(),
            })
        })
        .collect();

    let page = SectionPage::new("summary", &current, &state.filters, SummaryBody { links })?;
    Ok(WebJson(page))
}
