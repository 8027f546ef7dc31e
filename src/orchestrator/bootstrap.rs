//! Selector population at startup.
//!
//! A failed bootstrap call leaves its selectors with only the sentinel option.
//! The failure is logged and nothing is painted.

use crate::client::Backend;
use crate::model::NONE;
use chrono::TimeZone;
use serde::Serialize;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn sentinel() -> Self {
        Self {
            value: NONE.into(),
            label: NONE.into(),
        }
    }

    fn plain(value: String) -> Self {
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Options for all three selectors, without the leading sentinel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectorOptions {
    pub stats: Vec<SelectOption>,
    pub texts: Vec<SelectOption>,
    pub techs: Vec<SelectOption>,
}

/// Resolves the wall-clock offset in effect at a given instant.
pub trait LocalZone: Send + Sync {
    fn offset_at(&self, at: OffsetDateTime) -> UtcOffset;
}

/// The machine's time zone, looked up per instant so labels on either side of
/// a daylight-saving change each get their own offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemZone;

impl LocalZone for SystemZone {
    fn offset_at(&self, at: OffsetDateTime) -> UtcOffset {
        chrono::Local
            .timestamp_opt(at.unix_timestamp(), 0)
            .single()
            .and_then(|local| UtcOffset::from_whole_seconds(local.offset().local_minus_utc()).ok())
            .unwrap_or(UtcOffset::UTC)
    }
}

/// A fixed offset, e.g. UTC.
impl LocalZone for UtcOffset {
    fn offset_at(&self, _at: OffsetDateTime) -> UtcOffset {
        *self
    }
}

/// Label for a snapshot identifier, read as Unix seconds.
pub fn snapshot_label(id: &str, zone: &dyn LocalZone) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    id.trim()
        .split('.')
        .next()
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|t| t.to_offset(zone.offset_at(t)).format(&fmt).ok())
        .unwrap_or_else(|| id.to_string())
}

pub async fn load_historical_result_list<B: Backend>(
    backend: &B,
    zone: &dyn LocalZone,
) -> Vec<SelectOption> {
    match backend.list_results().await {
        Ok(list) => {
            tracing::info!(count = list.files.len(), "snapshot list loaded");
            list.files
                .into_iter()
                .map(|id| SelectOption {
                    label: snapshot_label(&id, zone),
                    value: id,
                })
                .collect()
        }
        Err(e) => {
            tracing::warn!(error = %e, "snapshot list unavailable");
            Vec::new()
        }
    }
}

/// Returns (search-text options, technology options).
pub async fn load_search_defaults<B: Backend>(
    backend: &B,
) -> (Vec<SelectOption>, Vec<SelectOption>) {
    match backend.last_defaults().await {
        Ok(defaults) => {
            tracing::info!(
                texts = defaults.vacancies.len(),
                techs = defaults.technologies.len(),
                "search defaults loaded"
            );
            (
                defaults.vacancies.into_iter().map(SelectOption::plain).collect(),
                defaults
                    .technologies
                    .into_iter()
                    .map(SelectOption::plain)
                    .collect(),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "search defaults unavailable");
            (Vec::new(), Vec::new())
        }
    }
}

/// Run both bootstrap calls concurrently.
pub async fn bootstrap<B: Backend>(backend: &B, zone: &dyn LocalZone) -> SelectorOptions {
    let (stats, (texts, techs)) = futures::join!(
        load_historical_result_list(backend, zone),
        load_search_defaults(backend)
    );
    SelectorOptions {
        stats,
        texts,
        techs,
    }
}
