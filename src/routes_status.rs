// --------------------------------------------------
// Read-only endpoints over the status engine: single-day status,
// aggregate stats with goal progress, and a calendar range view.
//
// Every endpoint accepts an optional ?today= override so the
// reference date is injectable instead of an implicit clock.
// --------------------------------------------------

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::logic::{self, DayStatus, HabitStats};
use crate::models::Db;
use crate::store;

fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, ()> {
    match raw {
        Some(s) => logic::parse_day(s).map_err(|_| ()),
        None => Ok(today_local()),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub date: String,          // "YYYY-MM-DD"
    pub today: Option<String>, // reference date override
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub date: NaiveDate,
    pub today: NaiveDate,
    pub status: DayStatus,
}

// -----------------------------
// GET /api/habits/:id/status?date=YYYY-MM-DD
// Resolves the habit's status on a single day
// -----------------------------
pub async fn get_status(
    Path(id): Path<String>,
    Query(q): Query<StatusQuery>,
) -> impl IntoResponse {
    let id = match uuid::Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };
    let date = match logic::parse_day(&q.date) {
        Ok(d) => d,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid date").into_response(),
    };
    let Ok(today) = resolve_today(q.today.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "invalid today").into_response();
    };

    let db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let Some(habit) = db.habits.iter().find(|h| h.id == id) else {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    };

    Json(StatusResponse {
        date,
        today,
        status: logic::status_on(habit, date, today),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub today: NaiveDate,
    pub stats: HabitStats,
    pub progress: f64, // percent toward the goal, 0..=100
}

// -----------------------------
// GET /api/habits/:id/stats
// Log-wide counts, current streak and goal progress
// -----------------------------
pub async fn get_stats(Path(id): Path<String>, Query(q): Query<StatsQuery>) -> impl IntoResponse {
    let id = match uuid::Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };
    let Ok(today) = resolve_today(q.today.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "invalid today").into_response();
    };

    let db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let Some(habit) = db.habits.iter().find(|h| h.id == id) else {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    };

    Json(StatsResponse {
        today,
        stats: logic::aggregate_stats(habit, today),
        progress: logic::progress_percent(habit),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub from: String,
    pub to: String,
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub today: NaiveDate,
    pub days: Vec<CalendarDay>,
}

// Keeps the calendar endpoint from walking unbounded ranges.
const MAX_CALENDAR_DAYS: i64 = 3700;

// -----------------------------
// GET /api/habits/:id/calendar?from=..&to=..
// Per-day statuses over an inclusive date range
// -----------------------------
pub async fn get_calendar(
    Path(id): Path<String>,
    Query(q): Query<CalendarQuery>,
) -> impl IntoResponse {
    let id = match uuid::Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };
    let from = match logic::parse_day(&q.from) {
        Ok(d) => d,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid from").into_response(),
    };
    let to = match logic::parse_day(&q.to) {
        Ok(d) => d,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid to").into_response(),
    };
    if to < from {
        return (StatusCode::BAD_REQUEST, "to before from").into_response();
    }
    if (to - from).num_days() > MAX_CALENDAR_DAYS {
        return (StatusCode::BAD_REQUEST, "range too large").into_response();
    }
    let Ok(today) = resolve_today(q.today.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "invalid today").into_response();
    };

    let db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let Some(habit) = db.habits.iter().find(|h| h.id == id) else {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    };

    let mut days = Vec::new();
    let mut day = from;
    while day <= to {
        days.push(CalendarDay {
            date: day,
            status: logic::status_on(habit, day, today),
        });
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Json(CalendarResponse { today, days }).into_response()
}
