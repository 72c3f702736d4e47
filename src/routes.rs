// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{marks, question, question_set, test_session},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the sub-routers of every service this process hosts.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let role = state.config.service;
    tracing::info!("Mounting routes for service role: {}", role);

    let mut router = Router::new();
    if role.hosts_questions() {
        router = router.merge(question_routes());
    }
    if role.hosts_tests() {
        router = router.merge(test_session_routes());
    }
    if role.hosts_marks() {
        router = router.merge(marks_routes());
    }

    router
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn question_routes() -> Router<AppState> {
    let questions = Router::new()
        .route(
            "/",
            get(question::list_questions).post(question::create_question),
        )
        .route(
            "/{id}",
            get(question::get_question)
                .put(question::update_question)
                .delete(question::delete_question),
        );

    let question_sets = Router::new()
        .route(
            "/",
            get(question_set::list_question_sets).post(question_set::create_question_set),
        )
        .route(
            "/{id}",
            get(question_set::get_question_set)
                .put(question_set::update_question_set)
                .delete(question_set::delete_question_set),
        )
        .route(
            "/{set_id}/questions/{question_id}",
            post(question_set::add_question).delete(question_set::remove_question),
        );

    Router::new()
        .nest("/api/questions", questions)
        .nest("/api/question-sets", question_sets)
}

fn test_session_routes() -> Router<AppState> {
    let sessions = Router::new()
        .route("/", get(test_session::list_test_sessions))
        .route("/start", post(test_session::start_test))
        .route("/usn/{usn}", get(test_session::list_sessions_for_student))
        .route("/{id}", get(test_session::get_test_session))
        .route("/{id}/answer", put(test_session::submit_answer))
        .route("/{id}/submit", post(test_session::submit_test));

    Router::new().nest("/api/test-sessions", sessions)
}

fn marks_routes() -> Router<AppState> {
    let marks = Router::new()
        .route("/", get(marks::list_results))
        .route("/calculate", post(marks::calculate_marks))
        .route("/test-session/{id}", get(marks::get_result_for_session))
        .route("/usn/{usn}", get(marks::list_results_for_student))
        .route("/dashboard", get(marks::dashboard))
        .route("/dashboard/usn/{usn}", get(marks::dashboard_for_student))
        .route(
            "/dashboard/department/{department}",
            get(marks::dashboard_for_department),
        )
        .route(
            "/dashboard/semester/{semester}",
            get(marks::dashboard_for_semester),
        );

    Router::new().nest("/api/marks", marks)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, db::connect_in_memory};

    async fn router_for(role: &str) -> Router {
        let role = role.to_string();
        let config = Config::from_lookup(|key| match key {
            "EXAM_SERVICE" => Some(role.clone()),
            _ => None,
        })
        .unwrap();
        let pool = connect_in_memory().await.unwrap();
        create_router(AppState::new(pool, config).unwrap())
    }

    async fn status_of(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn marks_role_mounts_only_marks_routes() {
        let router = router_for("marks").await;
        assert_eq!(status_of(router.clone(), "/api/marks/dashboard").await, StatusCode::OK);
        assert_eq!(status_of(router.clone(), "/api/test-sessions").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of(router, "/api/questions").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn all_role_mounts_everything() {
        let router = router_for("all").await;
        assert_eq!(status_of(router.clone(), "/api/questions").await, StatusCode::OK);
        assert_eq!(status_of(router.clone(), "/api/test-sessions").await, StatusCode::OK);
        assert_eq!(status_of(router.clone(), "/api/marks").await, StatusCode::OK);
        assert_eq!(
            status_of(router, "/api/test-sessions/42").await,
            StatusCode::NOT_FOUND
        );
    }
}
