use axum::{extract::State, routing::get};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::json::WebJson;
use crate::api::middleware::CurrentUser;
use crate::api::routes::Blueprint;
use crate::app::AppState;
use crate::features::SectionPage;

const INTERVALS: [(&str, i64); 3] = [("day", 1), ("week", 7), ("month", 30)];

#[derive(Debug, Serialize)]
pub struct Interval {
    pub name: &'static str,
    pub since: NaiveDate,
    pub since_label: Value,
}

#[derive(Debug, Serialize)]
pub struct StatsBody {
    pub intervals: Vec<Interval>,
}

pub fn blueprint() -> Blueprint {
    Blueprint::new("stats").route("/", "index", get(index))
}

/// Reporting intervals offered by the statistics pages
///
/// GET /stats
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<WebJson<SectionPage<StatsBody>>, ApiError> {
    let today = Utc::now().date_naive();
    let intervals = INTERVALS
        .iter()
        .map(|&(name, days)| -> Result<Interval, ApiError> {
            let since = today - Duration::days(days);
            let since_label = state
                .filters
                .apply("fancydate", &Value::from(since.format("%Y-%m-%d").to_string()))?;
            Ok(Interval {
                name,
                since,
                since_label,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(WebJson(SectionPage::new(
        "stats",
        &current,
        &state.filters,
        StatsBody { intervals },
    )?))
}
