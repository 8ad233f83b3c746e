// --------------------------------------------------
// Handles API endpoints for habit areas (grouping categories).
//
// Responsibilities:
// - Create / read / update / delete areas
// - Populate each area's habits on read (membership is derived
//   from Habit.area_id, never stored twice)
// --------------------------------------------------

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Area, Db, Habit};
use crate::store;

#[derive(Debug, Serialize)]
pub struct AreaResponse {
    pub id: Uuid,
    pub name: String,
    pub habits: Vec<Habit>,
}

// -----------------------------
// GET /api/areas
// Returns all areas with their habits populated
// -----------------------------
pub async fn get_areas() -> impl IntoResponse {
    let db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let areas: Vec<AreaResponse> = db
        .areas
        .iter()
        .map(|a| AreaResponse {
            id: a.id,
            name: a.name.clone(),
            habits: db
                .habits
                .iter()
                .filter(|h| h.area_id == Some(a.id))
                .cloned()
                .collect(),
        })
        .collect();

    Json(areas).into_response()
}

#[derive(Debug, Deserialize)]
pub struct AreaInput {
    pub name: String,
}

// -----------------------------
// POST /api/areas
// Creates a new area
// -----------------------------
pub async fn create_area(Json(input): Json<AreaInput>) -> impl IntoResponse {
    if input.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "name required").into_response();
    }

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let area = Area {
        id: Uuid::new_v4(),
        name: input.name,
    };
    db.areas.push(area.clone());

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(area).into_response()
}

// -----------------------------
// PUT /api/areas/:id
// Renames an area
// -----------------------------
pub async fn update_area(
    Path(id): Path<String>,
    Json(input): Json<AreaInput>,
) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    if input.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "name required").into_response();
    }

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let Some(area) = db.areas.iter_mut().find(|a| a.id == id) else {
        return (StatusCode::NOT_FOUND, "area not found").into_response();
    };

    area.name = input.name;
    let updated = area.clone();

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(updated).into_response()
}

// -----------------------------
// DELETE /api/areas/:id
// Removes an area; its habits are detached, not deleted
// -----------------------------
pub async fn delete_area(Path(id): Path<String>) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let _guard = store::write_lock();
    let mut db: Db = match store::load_db(&store::db_path()) {
        Ok(db) => db,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response(),
    };

    let before = db.areas.len();
    db.areas.retain(|a| a.id != id);

    if db.areas.len() == before {
        return (StatusCode::NOT_FOUND, "area not found").into_response();
    }

    for h in db.habits.iter_mut() {
        if h.area_id == Some(id) {
            h.area_id = None;
        }
    }

    if store::save_db(&store::db_path(), &db).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(serde_json::json!({ "ok": true })).into_response()
}
