use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{
    sea_query::{Alias, Query, SqliteQueryBuilder},
    Value,
};
use serde_json::json;

/// Raw `starsystems` row, written column by column so it can target any schema version.
#[derive(Clone, Debug)]
pub struct StarsystemRow {
    pub name: String,
    pub system_address: Option<i64>,
    pub payload: String,
    pub last_updated: NaiveDateTime,
    pub last_visit: Option<NaiveDateTime>,
    pub total_visits: i32,
    pub comment: Option<String>,
}

impl StarsystemRow {
    /// A freshly updated row holding a complete payload for `name` at `system_address`.
    pub fn new(name: &str, system_address: i64) -> Self {
        Self {
            name: name.to_string(),
            system_address: Some(system_address),
            payload: payload_json(system_address, name, true),
            last_updated: Utc::now().naive_utc(),
            last_visit: None,
            total_visits: 0,
            comment: None,
        }
    }

    /// A row written before system addresses were tracked.
    pub fn unaddressed(name: &str) -> Self {
        Self {
            system_address: None,
            payload: payload_json(0, name, true),
            ..Self::new(name, 0)
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn updated_hours_ago(mut self, hours: i64) -> Self {
        self.last_updated = (Utc::now() - Duration::hours(hours)).naive_utc();
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn with_last_visit(mut self, last_visit: NaiveDateTime, total_visits: i32) -> Self {
        self.last_visit = Some(last_visit);
        self.total_visits = total_visits;
        self
    }

    /// Builds the INSERT for this row, skipping columns missing from `columns`.
    pub fn insert_sql(&self, columns: &[String]) -> String {
        let candidates: Vec<(&str, Value)> = vec![
            ("name", self.name.clone().into()),
            ("totalvisits", self.total_visits.into()),
            ("lastvisit", self.last_visit.into()),
            ("starsystem", self.payload.clone().into()),
            ("starsystemlastupdated", self.last_updated.into()),
            ("comment", self.comment.clone().into()),
            ("systemaddress", self.system_address.into()),
        ];
        let (names, values): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .filter(|(name, _)| columns.iter().any(|c| c.eq_ignore_ascii_case(name)))
            .unzip();

        Query::insert()
            .into_table(Alias::new("starsystems"))
            .columns(names.into_iter().map(Alias::new))
            .values_panic(values.into_iter().map(Into::into))
            .to_string(SqliteQueryBuilder)
    }
}

/// Serialized star system payload in the stored JSON shape.
///
/// Incomplete payloads omit the `z` coordinate.
pub fn payload_json(system_address: i64, name: &str, complete: bool) -> String {
    let mut payload = json!({
        "systemAddress": system_address,
        "name": name,
        "x": 0.0,
        "y": 0.0,
        "visitLog": [],
        "bodies": [],
        "stations": [],
        "factions": [],
    });
    if complete {
        payload["z"] = json!(0.0);
    }

    payload.to_string()
}
