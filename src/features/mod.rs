//! Feature route groups mounted by the application
//!
//! Each submodule exposes a `blueprint()` describing its routes. The page
//! handlers render a [`SectionPage`] through [`WebJson`](crate::api::json::WebJson).

pub mod dumpdirs;
pub mod login;
pub mod problems;
pub mod reports;
pub mod stats;
pub mod summary;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::domain::user::value_objects::Username;
use crate::filters::Filters;

/// Page model shared by the section index pages
#[derive(Debug, Serialize)]
pub struct SectionPage<T: Serialize> {
    pub section: &'static str,
    pub user: Option<Username>,
    pub generated_at: DateTime<Utc>,
    pub generated_timestamp: Value,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> SectionPage<T> {
    pub fn new(
        section: &'static str,
        current: &CurrentUser,
        filters: &Filters,
        body: T,
    ) -> Result<Self, ApiError> {
        let generated_at = Utc::now();
        let generated_timestamp =
            filters.apply("timestamp", &Value::from(generated_at.to_rfc3339()))?;

        Ok(Self {
            section,
            user: current.user().map(|user| user.username.clone()),
            generated_at,
            generated_timestamp,
            body,
        })
    }
}
