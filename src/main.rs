use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use config::Config;
use store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ws_tx: broadcast::Sender<String>,
}

fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        // Daily records
        .route(
            "/daily-records",
            post(handlers::daily_records::upsert_daily_record)
                .get(handlers::daily_records::list_daily_records),
        )
        .route("/summary/weekly", get(handlers::summary::get_weekly_summary))
        // Gamification
        .route("/gamification", get(handlers::gamification::get_gamification))
        .route("/gamification/points", post(handlers::gamification::award_points))
        .route("/gamification/streak", post(handlers::gamification::advance_streak))
        .route("/gamification/badges", post(handlers::gamification::unlock_badge))
        .route("/gamification/goals", put(handlers::gamification::update_goals))
        .route(
            "/gamification/challenges",
            put(handlers::gamification::update_challenges),
        )
        // Study sessions
        .route(
            "/study-sessions",
            post(handlers::study_sessions::start_session)
                .get(handlers::study_sessions::list_sessions),
        )
        .route(
            "/study-sessions/:session_id/end",
            post(handlers::study_sessions::end_session),
        )
        // Reminders
        .route(
            "/reminders",
            get(handlers::reminders::list_reminders).post(handlers::reminders::create_reminder),
        )
        .route(
            "/reminders/:reminder_id",
            put(handlers::reminders::update_reminder).delete(handlers::reminders::delete_reminder),
        )
        .route("/due-reminders", get(handlers::reminders::due_reminders))
        // Motivation & tips
        .route("/motivation", get(handlers::motivation::get_motivation))
        .route("/motivation/snapshot", put(handlers::motivation::put_snapshot))
        .route("/tips", get(handlers::tips::get_tips));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler))
        .nest("/api/users/:user_id", user_routes)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studytrack_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match config.database_url.as_deref() {
        Some(url) => {
            let db = db::create_pool(url, config.db_max_connections).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            tracing::info!("Database migrations applied");
            Arc::new(PgStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, progress is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let (ws_tx, _) = broadcast::channel::<String>(config.event_channel_capacity);

    let state = AppState { store, ws_tx };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors_layer(&config)),
    );

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_state() -> AppState {
        let (ws_tx, _) = broadcast::channel::<String>(16);
        AppState {
            store: Arc::new(MemoryStore::new()),
            ws_tx,
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let app = build_router(test_state());

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, Method::GET, "/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["store"], "ok");
    }

    #[tokio::test]
    async fn test_weekly_summary_end_to_end() {
        let app = build_router(test_state());
        let base = format!("/api/users/{}", Uuid::new_v4());
        let records = format!("{base}/daily-records");

        for (date, scores) in [
            ("2024-03-08", json!({ "matematik": { "correct": 5, "incorrect": 2 } })),
            ("2024-03-09", json!({ "matematik": { "correct": 3, "incorrect": 1 } })),
            ("2024-03-10", json!({ "turkce": { "correct": 10, "incorrect": 0 } })),
            // Outside the window ending 2024-03-10
            ("2024-03-01", json!({ "fen": { "correct": 50, "incorrect": 0 } })),
        ] {
            let (status, _) = send(
                &app,
                Method::POST,
                &records,
                Some(json!({ "date": date, "scores": scores })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("{base}/summary/weekly?date=2024-03-10"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_correct"], 18);
        assert_eq!(body["total_incorrect"], 3);
        assert_eq!(body["best_subject"], "turkce");
        // Subjects with no answers count as zero; fen is the first of them.
        assert_eq!(body["worst_subject"], "fen");
        assert_eq!(body["window"]["start"], "2024-03-04");
        assert_eq!(body["goals"]["questions"]["current"], 21);
        assert_eq!(body["goals"]["questions"]["target"], 100);
        assert_eq!(body["study_minutes"], 0);
    }

    #[tokio::test]
    async fn test_summary_at_calendar_minimum_is_rejected() {
        let app = build_router(test_state());
        let uri = format!(
            "/api/users/{}/summary/weekly?date=-262143-01-03",
            Uuid::new_v4()
        );

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);
    }

    #[tokio::test]
    async fn test_history_at_calendar_minimum_is_rejected() {
        let app = build_router(test_state());
        let uri = format!(
            "/api/users/{}/daily-records?end_date=-262143-01-03",
            Uuid::new_v4()
        );

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);
    }

    #[tokio::test]
    async fn test_empty_week_reports_none() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/summary/weekly?date=2024-03-10", Uuid::new_v4());

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_correct"], 0);
        assert_eq!(body["best_subject"], "none");
        assert_eq!(body["worst_subject"], "none");
    }

    #[tokio::test]
    async fn test_negative_count_is_rejected() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/daily-records", Uuid::new_v4());

        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "date": "2024-03-10", "scores": { "fen": { "correct": -1, "incorrect": 0 } } })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);
    }

    #[tokio::test]
    async fn test_far_future_record_is_rejected() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/daily-records", Uuid::new_v4());
        let date = chrono::Utc::now().date_naive() + chrono::Duration::days(3);

        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "date": date, "scores": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_inverted_history_range_is_rejected() {
        let app = build_router(test_state());
        let uri = format!(
            "/api/users/{}/daily-records?start_date=2024-03-10&end_date=2024-03-01",
            Uuid::new_v4()
        );

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_level_up_is_reported_and_broadcast() {
        let state = test_state();
        let mut rx = state.ws_tx.subscribe();
        let app = build_router(state);
        let user_id = Uuid::new_v4();
        let uri = format!("/api/users/{user_id}/gamification/points");

        let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "delta": 50 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leveled_up"], false);
        assert_eq!(body["current_level"], 1);

        let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "delta": 260 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leveled_up"], true);
        assert_eq!(body["total_points"], 310);
        assert_eq!(body["current_level"], 3);
        assert_eq!(body["level_title"], "Gümüş");
        assert!(body.get("revision").is_none());

        let event: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(event["type"], "level_up");
        assert_eq!(event["user_id"], user_id.to_string());
        assert_eq!(event["level"], 3);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_negative_delta_is_rejected() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/gamification/points", Uuid::new_v4());

        let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "delta": -5 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_streak_rules_over_http() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/gamification/streak", Uuid::new_v4());

        let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "today": "2024-01-01" }))).await;
        assert_eq!(body["streak_days"], 1);

        let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "today": "2024-01-02" }))).await;
        assert_eq!(body["streak_days"], 2);
        assert_eq!(body["last_activity_date"], "2024-01-02");

        let (status, body) =
            send(&app, Method::POST, &uri, Some(json!({ "today": "2023-12-31" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);

        let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "today": "2024-01-10" }))).await;
        assert_eq!(body["streak_days"], 1);
    }

    #[tokio::test]
    async fn test_badge_unlock_is_idempotent() {
        let state = test_state();
        let mut rx = state.ws_tx.subscribe();
        let app = build_router(state);
        let uri = format!("/api/users/{}/gamification/badges", Uuid::new_v4());
        let badge = json!({ "badge_id": "B1", "badge_name": "İlk Adım" });

        let (_, first) = send(&app, Method::POST, &uri, Some(badge.clone())).await;
        assert_eq!(first["already_had"], false);
        assert_eq!(first["badges_earned"], json!(["B1"]));

        let (_, second) = send(&app, Method::POST, &uri, Some(badge)).await;
        assert_eq!(second["already_had"], true);
        assert_eq!(second["badges_earned"], json!(["B1"]));

        let event: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(event["type"], "badge_unlocked");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_goals_update_and_validation() {
        let app = build_router(test_state());
        let base = format!("/api/users/{}/gamification", Uuid::new_v4());
        let goals_uri = format!("{base}/goals");

        let (status, _) = send(
            &app,
            Method::PUT,
            &goals_uri,
            Some(json!({ "questions_target": 50, "study_hours_target": 5, "accuracy_target": 150 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            Method::PUT,
            &goals_uri,
            Some(json!({ "questions_target": 50, "study_hours_target": 5, "accuracy_target": 70 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weekly_goals"]["questions_target"], 50);

        let (_, body) = send(&app, Method::GET, &base, None).await;
        assert_eq!(body["weekly_goals"]["accuracy_target"], 70);
        assert_eq!(body["level_title"], "Bronz");
    }

    #[tokio::test]
    async fn test_motivation_assessment() {
        let app = build_router(test_state());
        let base = format!("/api/users/{}/motivation", Uuid::new_v4());

        let (_, body) = send(&app, Method::GET, &base, None).await;
        assert_eq!(body["score"], 0);
        assert_eq!(body["tier"], "Çok Düşük");

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("{base}/snapshot"),
            Some(json!({
                "study_time_minutes": 150,
                "accuracy_percentage": 95.0,
                "streak_days": 10,
                "goals_completed": 6
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, &base, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 100);
        assert_eq!(body["tier"], "Yüksek");
        assert_eq!(body["snapshot"]["streak_days"], 10);
        let message = body["daily_message"].as_str().unwrap();
        assert!(services::tips::DAILY_MESSAGES.iter().any(|m| *m == message));
    }

    #[tokio::test]
    async fn test_out_of_range_snapshot_is_rejected() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/motivation/snapshot", Uuid::new_v4());

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({
                "study_time_minutes": 10,
                "accuracy_percentage": 140.0,
                "streak_days": 1,
                "goals_completed": 0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_tips_name_worst_subject() {
        let app = build_router(test_state());
        let user_id = Uuid::new_v4();
        let today = chrono::Utc::now().date_naive();
        let scores = json!({
            "turkce": { "correct": 4 },
            "matematik": { "correct": 4 },
            "fen": { "correct": 4 },
            "sosyal": { "correct": 4 },
            "ingilizce": { "correct": 1 },
            "din": { "correct": 4 }
        });
        send(
            &app,
            Method::POST,
            &format!("/api/users/{user_id}/daily-records"),
            Some(json!({ "date": today, "scores": scores })),
        )
        .await;

        let (status, body) = send(&app, Method::GET, &format!("/api/users/{user_id}/tips"), None).await;
        assert_eq!(status, StatusCode::OK);
        let study_tips = body["study_tips"].as_array().unwrap();
        assert_eq!(study_tips.len(), 7);
        assert!(study_tips[0].as_str().unwrap().contains("İngilizce"));
        assert_eq!(body["motivation_tips"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_study_session_counts_towards_study_goal() {
        let app = build_router(test_state());
        let base = format!("/api/users/{}", Uuid::new_v4());
        let sessions = format!("{base}/study-sessions");

        let (status, started) = send(
            &app,
            Method::POST,
            &sessions,
            Some(json!({ "subject": "matematik" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(started["session_type"], "pomodoro");
        assert!(started["ended_at"].is_null());
        let end_uri = format!("{sessions}/{}/end", started["id"].as_str().unwrap());

        let (status, ended) = send(
            &app,
            Method::POST,
            &end_uri,
            Some(json!({ "duration_minutes": 45, "questions_solved": 20, "correct_answers": 15 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ended["duration_minutes"], 45);

        // Ending twice is a domain error.
        let (status, _) = send(&app, Method::POST, &end_uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, list) = send(&app, Method::GET, &sessions, None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, &format!("{base}/summary/weekly"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["study_minutes"], 45);
        assert_eq!(body["goals"]["study_time"]["current"], 45);
        assert_eq!(body["goals"]["study_time"]["target"], 600);
    }

    #[tokio::test]
    async fn test_ending_unknown_session_is_not_found() {
        let app = build_router(test_state());
        let uri = format!(
            "/api/users/{}/study-sessions/{}/end",
            Uuid::new_v4(),
            Uuid::new_v4()
        );

        let (status, body) = send(&app, Method::POST, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 404);
    }

    #[tokio::test]
    async fn test_challenge_board_update_and_events() {
        let state = test_state();
        let mut rx = state.ws_tx.subscribe();
        let app = build_router(state);
        let user_id = Uuid::new_v4();
        let uri = format!("/api/users/{user_id}/gamification/challenges");

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "completed": [], "in_progress": ["solve_50"], "locked": ["perfect_day"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daily_challenges"]["in_progress"], json!(["solve_50"]));
        assert!(rx.try_recv().is_err());

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "completed": ["solve_50"], "in_progress": [], "locked": ["perfect_day"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daily_challenges"]["completed"], json!(["solve_50"]));

        let event: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(event["type"], "challenge_completed");
        assert_eq!(event["challenge_id"], "solve_50");
        assert!(rx.try_recv().is_err());

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "completed": ["solve_50"], "in_progress": ["solve_50"], "locked": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reminder_crud_and_due() {
        let app = build_router(test_state());
        let base = format!("/api/users/{}", Uuid::new_v4());
        let reminders = format!("{base}/reminders");

        let (status, created) = send(
            &app,
            Method::POST,
            &reminders,
            Some(json!({
                "text": "Matematik çalışma zamanı!",
                "time": "09:00",
                "days": ["wednesday", "monday", "monday"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["days"], json!(["monday", "wednesday"]));
        assert_eq!(created["active"], true);
        let item = format!("{reminders}/{}", created["id"].as_str().unwrap());

        // 2024-03-04 is a Monday.
        let due_uri = format!("{base}/due-reminders?at=2024-03-04T09:00:30");
        let (_, due) = send(&app, Method::GET, &due_uri, None).await;
        assert_eq!(due.as_array().unwrap().len(), 1);

        let (status, updated) =
            send(&app, Method::PUT, &item, Some(json!({ "active": false }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["active"], false);
        assert_eq!(updated["time"], "09:00");

        let (_, due) = send(&app, Method::GET, &due_uri, None).await;
        assert!(due.as_array().unwrap().is_empty());

        let (status, _) = send(&app, Method::DELETE, &item, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &item, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, &reminders, None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_updating_unknown_reminder_is_not_found() {
        let app = build_router(test_state());
        let uri = format!("/api/users/{}/reminders/{}", Uuid::new_v4(), Uuid::new_v4());

        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "text": "Fen tekrarı" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
