// Define data modules
mod models; // Data structures (Habit, Area, Db, etc.)
mod store; // Persistent storage (load/save db.json)
mod logic; // Core habit status engine
mod routes_habits; // HTTP handlers for habit CRUD & activity log
mod routes_areas; // HTTP handlers for area CRUD
mod routes_status; // HTTP handlers for status / stats / calendar views

// Import axum routing utilities and Router
use axum::{
    routing::{get, post, put}, // HTTP method helpers
    Router,                    // Main router type
};
use std::net::SocketAddr;
use tower_http::services::ServeDir; // Used to serve static files (HTML/CSS/JS)

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let api = Router::new()
        // habits
        .route(
            "/habits",
            get(routes_habits::get_habits).post(routes_habits::create_habit),
        )
        .route(
            "/habits/:id",
            get(routes_habits::get_habit)
                .put(routes_habits::update_habit)
                .delete(routes_habits::delete_habit),
        )
        .route("/habits/:id/log", post(routes_habits::log_habit))
        // derived views over the status engine
        .route("/habits/:id/status", get(routes_status::get_status))
        .route("/habits/:id/stats", get(routes_status::get_stats))
        .route("/habits/:id/calendar", get(routes_status::get_calendar))
        // areas
        .route(
            "/areas",
            get(routes_areas::get_areas).post(routes_areas::create_area),
        )
        .route(
            "/areas/:id",
            put(routes_areas::update_area).delete(routes_areas::delete_area),
        );

    let app = Router::new()
        .nest("/api", api)
        .nest_service("/", ServeDir::new("static"));

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let addr: SocketAddr = bind.parse().expect("invalid BIND_ADDR");

    tracing::info!("server running at http://{}", addr);
    tracing::info!("API base: http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind failed");

    axum::serve(listener, app).await.expect("server error");
}
