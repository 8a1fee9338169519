use axum::{extract::State, routing::get};
use serde::Serialize;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::json::WebJson;
use crate::api::middleware::CurrentUser;
use crate::api::routes::Blueprint;
use crate::app::AppState;
use crate::features::SectionPage;

/// Problem states shown in the state legend
pub const PROBLEM_STATES: [&str; 4] = ["NEW", "PROCESSED", "FIXED", "WONTFIX"];

#[derive(Debug, Serialize)]
pub struct StateLegend {
    pub state: &'static str,
    pub label: Value,
}

#[derive(Debug, Serialize)]
pub struct ProblemsBody {
    pub states: Vec<StateLegend>,
}

pub fn blueprint() -> Blueprint {
    Blueprint::new("problems").route("/", "index", get(index))
}

/// GET /problems
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<WebJson<SectionPage<ProblemsBody>>, ApiError> {
    let states = PROBLEM_STATES
        .iter()
        .copied()
        .map(|problem_state| -> Result<StateLegend, ApiError> {
            Ok(StateLegend {
                state: problem_state,
                label: state.filters.apply("problem_label", &Value::from(problem_state))?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(WebJson(SectionPage::new(
        "problems",
        &current,
        &state.filters,
        ProblemsBody { states },
    )?))
}
