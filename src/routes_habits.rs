// --------------------------------------------------
// Handles API endpoints related to habit CRUD operations
// and the per-habit activity log.
//
// Responsibilities:
// - Create / read / update / delete habits
// - Record a log entry for a date (one entry per day)
// -------------------------------------------------

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

use crate::logic;
use crate::models::{CompletionTarget, Db, Goal, Habit, LogEntry, RepeatPattern, TimeOfDay};
use crate::store;

fn now_fixed_offset() -> DateTime<FixedOffset> {
    let local = chrono::Local::now();
    let offset_seconds = local.offset().local_minus_utc();
    let fixed = FixedOffset::east_opt(offset_seconds).unwrap();
    local.with_timezone(&fixed)
}

// Field-level checks shared by create and update.
fn validate_goal(goal: &Goal) -> Option<&'static str> {
    if !(goal.value > 0.0) {
        return Some("goal value must be positive");
    }
    None
}

fn validate_pattern(pattern: &RepeatPattern) -> Option<&'static str> {
    match pattern {
        RepeatPattern::Daily => None,
        RepeatPattern::Weekly { days_of_week } => {
            if days_of_week.is_empty() {
                return Some("weekly pattern needs at least one day");
            }
            if days_of_week.iter().any(|d| *d > 6) {
                return Some("days_of_week must be 0..=6");
            }
            None
        }
        RepeatPattern::Monthly { day_of_month } => {
            if !(1..=31).contains(day_of_month) {
                return Some("day_of_month must be 1..=31");
            }
            None
        }
        RepeatPattern::Yearly {
            month_of_year,
            day_of_month,
        } => {
            if !(1..=12).contains(month_of_year) {
                return Some("month_of_year must be 1..=12");
            }
            if !(1..=31).contains(day_of_month) {
                return Some("day_of_month must be 1..=31");
            }
            None
        }
        RepeatPattern::Unknown => Some("unknown repeat pattern type"),
    }
}

// -----------------------------
// GET /api/habits
// Returns all habits stored in db.json
// -----------------------------
pub async fn get_habits() -> impl IntoResponse {
    let db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    Json(db.habits).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitInput {
    pub name: String,
    pub emoji: Option<String>,
    pub goal: Goal,
    pub repeat_pattern: RepeatPattern,
    pub completion_target: Option<CompletionTarget>,
    #[serde(default)]
    pub time_of_day: Vec<TimeOfDay>,
    pub specific_time: Option<DateTime<FixedOffset>>,
    pub start_date: String, // "YYYY-MM-DD" or RFC3339
    pub end_date: Option<String>,
    pub area_id: Option<Uuid>,
}

// -----------------------------
// POST /api/habits
// Creates a new habit and saves it to db.json
// -----------------------------
pub async fn create_habit(Json(input): Json<CreateHabitInput>) -> impl IntoResponse {
    if input.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "name required").into_response();
    }
    if let Some(msg) = validate_goal(&input.goal) {
        return (StatusCode::BAD_REQUEST, msg).into_response();
    }
    if let Some(msg) = validate_pattern(&input.repeat_pattern) {
        return (StatusCode::BAD_REQUEST, msg).into_response();
    }

    let start_date = match logic::parse_day(&input.start_date) {
        Ok(d) => d,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid start_date").into_response(),
    };
    let end_date = match input.end_date.as_deref() {
        Some(raw) => match logic::parse_day(raw) {
            Ok(d) => Some(d),
            Err(_) => return (StatusCode::BAD_REQUEST, "invalid end_date").into_response(),
        },
        None => None,
    };
    if let Some(end) = end_date {
        if end < start_date {
            return (StatusCode::BAD_REQUEST, "end_date before start_date").into_response();
        }
    }

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    if let Some(area_id) = input.area_id {
        if !db.areas.iter().any(|a| a.id == area_id) {
            return (StatusCode::BAD_REQUEST, "unknown area").into_response();
        }
    }

    let habit = Habit {
        id: Uuid::new_v4(),
        name: input.name,
        emoji: input.emoji,
        goal: input.goal,
        repeat_pattern: input.repeat_pattern,
        completion_target: input.completion_target,
        time_of_day: input.time_of_day,
        specific_time: input.specific_time,
        start_date,
        end_date,
        area_id: input.area_id,
        log: Vec::new(),
        created_at: now_fixed_offset(),
    };

    db.habits.push(habit.clone());

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    tracing::info!(habit = %habit.id, "habit created");
    Json(habit).into_response()
}

// -----------------------------
// GET /api/habits/:id
// Returns a single habit by ID
// -----------------------------
pub async fn get_habit(Path(id): Path<String>) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let Some(habit) = db.habits.iter().find(|h| h.id == id) else {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    };

    Json(habit.clone()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitInput {
    pub name: String,
    pub emoji: Option<String>,
    pub goal: Goal,
    pub repeat_pattern: RepeatPattern,
    pub completion_target: Option<CompletionTarget>,
    #[serde(default)]
    pub time_of_day: Vec<TimeOfDay>,
    pub specific_time: Option<DateTime<FixedOffset>>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub area_id: Option<Uuid>,
}

// -----------------------------
// PUT /api/habits/:id
// Updates an existing habit by ID (log untouched)
// -----------------------------
pub async fn update_habit(
    Path(id): Path<String>,
    Json(input): Json<UpdateHabitInput>,
) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    if input.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "name required").into_response();
    }
    if let Some(msg) = validate_goal(&input.goal) {
        return (StatusCode::BAD_REQUEST, msg).into_response();
    }
    if let Some(msg) = validate_pattern(&input.repeat_pattern) {
        return (StatusCode::BAD_REQUEST, msg).into_response();
    }

    let start_date = match logic::parse_day(&input.start_date) {
        Ok(d) => d,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid start_date").into_response(),
    };
    let end_date = match input.end_date.as_deref() {
        Some(raw) => match logic::parse_day(raw) {
            Ok(d) => Some(d),
            Err(_) => return (StatusCode::BAD_REQUEST, "invalid end_date").into_response(),
        },
        None => None,
    };
    if let Some(end) = end_date {
        if end < start_date {
            return (StatusCode::BAD_REQUEST, "end_date before start_date").into_response();
        }
    }

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    if let Some(area_id) = input.area_id {
        if !db.areas.iter().any(|a| a.id == area_id) {
            return (StatusCode::BAD_REQUEST, "unknown area").into_response();
        }
    }

    let Some(h) = db.habits.iter_mut().find(|h| h.id == id) else {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    };

    h.name = input.name;
    h.emoji = input.emoji;
    h.goal = input.goal;
    h.repeat_pattern = input.repeat_pattern;
    h.completion_target = input.completion_target;
    h.time_of_day = input.time_of_day;
    h.specific_time = input.specific_time;
    h.start_date = start_date;
    h.end_date = end_date;
    h.area_id = input.area_id;

    let updated = h.clone();

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(updated).into_response()
}

// -----------------------------
// DELETE /api/habits/:id
// Removes a habit permanently
// -----------------------------
pub async fn delete_habit(Path(id): Path<String>) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let before = db.habits.len();
    db.habits.retain(|h| h.id != id);

    if db.habits.len() == before {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    }

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    tracing::info!(habit = %id, "habit deleted");
    Json(serde_json::json!({ "ok": true })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LogInput {
    pub date: String, // "YYYY-MM-DD" or RFC3339; normalized to the day
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub value: f64,
}

// -----------------------------
// POST /api/habits/:id/log
// Records activity for a date. One authoritative entry per calendar
// day: an existing entry for that day is replaced, not duplicated.
// -----------------------------
pub async fn log_habit(Path(id): Path<String>, Json(input): Json<LogInput>) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let date = match logic::parse_day(&input.date) {
        Ok(d) => d,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid date").into_response(),
    };

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let Some(h) = db.habits.iter_mut().find(|h| h.id == id) else {
        return (StatusCode::NOT_FOUND, "habit not found").into_response();
    };

    let entry = LogEntry {
        date,
        completed: input.completed,
        skipped: input.skipped,
        value: input.value,
    };

    h.record(entry);

    let updated = h.clone();

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(updated).into_response()
}
