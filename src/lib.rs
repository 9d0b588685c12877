//! Study-trip program quote service.
//!
//! Server-rendered quote calculator plus a JSON API for recomputing quotes
//! and saving labeled snapshots of them against travel programs.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pricing;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::cache::AppCache;
use crate::config::Config;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    let api = pricing::router().layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(|| async { axum::response::Redirect::to("/quotes/new") }))
        .route("/health", get(routes::health::health))
        .route("/quotes/new", get(routes::calculator::new_quote))
        .route("/quotes/preview", post(routes::calculator::preview))
        .route(
            "/programs/:program_id/quotes/new",
            get(routes::calculator::new_program_quote),
        )
        .route(
            "/programs/:program_id/quotes",
            post(routes::calculator::save_snapshot),
        )
        .route(
            "/programs/:program_id/quotes/:snapshot_id",
            get(routes::calculator::show_snapshot),
        )
        .nest("/api", api)
        .nest_service("/static", static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// State whose pool never connects; only DB-free routes are exercised
    fn test_state() -> AppState {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/studytrip_test")
            .unwrap();
        AppState {
            db,
            cache: AppCache::new(),
            config: Arc::new(Config {
                database_url: "postgres://localhost/studytrip_test".to_string(),
                ..Config::default()
            }),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_calculate_api_worked_example() {
        let payload = serde_json::json!({
            "min_participants": "10",
            "nights": "5",
            "total_days": "6",
            "agency_staff_count": "1",
            "installment_count": "3",
            "room_cost_per_night": "120",
            "flight_cost_per_person": "500",
            "agency_per_diem": "100",
            "professor_per_diem": "",
            "insurance_per_person": "40",
            "fee_per_person": "500",
            "bank_commission_rate": "0.04"
        });

        let response = app(test_state())
            .oneshot(
                Request::post("/api/quotes/calculate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["fixed_cost_per_person"]["amount"], "280.00");
        assert_eq!(json["variable_cost_per_person"]["amount"], "1040.00");
        assert_eq!(json["tiers"][1]["occupancy"], "double");
        assert_eq!(json["tiers"][1]["price"]["amount"], "1687.50");
        assert_eq!(json["tiers"][1]["price"]["currency"], "USD");
        assert_eq!(json["tiers"][1]["installment_amount"]["amount"], "590.62");
        assert_eq!(json["installment_count"], 3);
    }

    #[tokio::test]
    async fn test_preview_page_renders_results() {
        let body = "min_participants=10&nights=5&total_days=6&agency_staff_count=1\
                    &room_cost_per_night=120&flight_cost_per_person=500&agency_per_diem=100\
                    &insurance_per_person=40&fee_per_person=500&bank_commission_rate=0.04\
                    &installment_count=3&aux_description=Theme+Park+Pass&aux_value=150\
                    &aux_description=&aux_value=";

        let response = app(test_state())
            .oneshot(
                Request::post("/quotes/preview")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        // 1687.50 + 150 / 0.96
        assert!(html.contains("1,843.75"), "{html}");
        assert!(html.contains("Theme Park Pass"));
        assert!(html.contains("3 installments of"));
    }

    #[tokio::test]
    async fn test_new_quote_page_has_no_results() {
        let response = app(test_state())
            .oneshot(Request::get("/quotes/new").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("Program quote calculator"));
        assert!(!html.contains("class=\"results\""));
    }

    #[tokio::test]
    async fn test_program_quote_page_offers_first_save() {
        let state = test_state();
        let program = models::Program {
            id: uuid::Uuid::new_v4(),
            name: "Kyoto Field Study".to_string(),
            destination_city: "Kyoto".to_string(),
            start_date: None,
            end_date: None,
            active: true,
            created_at: chrono::Utc::now(),
        };
        let program_id = program.id;
        state.cache.programs.insert(program_id, Arc::new(program)).await;

        let response = app(state)
            .oneshot(
                Request::get(format!("/programs/{}/quotes/new", program_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("Kyoto Field Study"));
        assert!(html.contains("new quote"));
        assert!(html.contains(&format!("formaction=\"/programs/{}/quotes\"", program_id)));
        assert!(!html.contains("class=\"results\""));
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_snapshot_routes_reject_malformed_ids() {
        let response = app(test_state())
            .oneshot(
                Request::get("/api/quotes/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
