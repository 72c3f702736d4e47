// tests/api_tests.rs

use exam_portal::{
    config::{Config, ServiceRole},
    db::{self, QuestionRepository, seed::seed_question_bank},
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use url::Url;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// Every spawned app gets its own in-memory database with the demo question
/// bank seeded (set 1 holds questions 1, 2, 3 keyed B, C, A). Collaborator
/// URLs default to the app itself; `question_service_url` overrides the
/// question service.
async fn spawn_app_with(role: ServiceRole, question_service_url: Option<&str>) -> String {
    // 1. Create a pool
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");

    seed_question_bank(&QuestionRepository::new(pool.clone()))
        .await
        .expect("Failed to seed question bank");

    // 2. Bind to port 0 first: the services call each other on this address
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    let own_url = Url::parse(&address).unwrap();

    // 3. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        service: role,
        host: "127.0.0.1".to_string(),
        port,
        question_service_url: question_service_url
            .map(|raw| Url::parse(raw).unwrap())
            .unwrap_or_else(|| own_url.clone()),
        test_service_url: own_url.clone(),
        marks_service_url: own_url,
        upstream_timeout_secs: 5,
        seed_question_bank: true,
    };

    let state = AppState::new(pool, config).expect("Failed to build app state");

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn spawn_app() -> String {
    spawn_app_with(ServiceRole::All, None).await
}

async fn start_test(client: &reqwest::Client, address: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/test-sessions/start", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

fn start_body(usn: &str, semester: i32) -> Value {
    json!({
        "usn": usn,
        "studentName": "Asha Rao",
        "semester": semester,
        "questionSetId": 1
    })
}

async fn answer(
    client: &reqwest::Client,
    address: &str,
    session_id: i64,
    question_id: i64,
    option: &str,
) -> reqwest::Response {
    client
        .put(format!("{}/api/test-sessions/{}/answer", address, session_id))
        .json(&json!({ "questionId": question_id, "selectedOption": option }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn question_crud_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Create
    let response = client
        .post(format!("{}/api/questions", address))
        .json(&json!({
            "questionText": "Which sort is stable?",
            "optionA": "Quick sort",
            "optionB": "Merge sort",
            "optionC": "Heap sort",
            "optionD": "Selection sort",
            "correctOption": "b",
            "semester": 4,
            "department": "is"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["correctOption"], "B");
    assert_eq!(created["department"], "IS");
    let id = created["id"].as_i64().unwrap();

    // Filtered list
    let listed: Value = client
        .get(format!("{}/api/questions?semester=4&department=IS", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Replace
    let response = client
        .put(format!("{}/api/questions/{}", address, id))
        .json(&json!({
            "questionText": "Which sort is stable?",
            "optionA": "Quick sort",
            "optionB": "Heap sort",
            "optionC": "Merge sort",
            "optionD": "Selection sort",
            "correctOption": "C",
            "semester": 4,
            "department": "IS"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["optionC"], "Merge sort");

    // Delete, then it is gone
    let response = client
        .delete(format!("{}/api/questions/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(format!("{}/api/questions/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn question_text_is_stored_verbatim() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/questions", address))
        .json(&json!({
            "questionText": "  Is 3 < 5 && 5 > 2? ",
            "optionA": "<div>",
            "optionB": "Yes & no",
            "optionC": "No",
            "optionD": "a<b",
            "correctOption": "A",
            "semester": 6,
            "department": "CS"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let question: Value = client
        .get(format!("{}/api/questions/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(question["questionText"], "Is 3 < 5 && 5 > 2?");
    assert_eq!(question["optionA"], "<div>");
    assert_eq!(question["optionB"], "Yes & no");
    assert_eq!(question["optionD"], "a<b");

    let set: Value = client
        .post(format!("{}/api/question-sets", address))
        .json(&json!({
            "name": "Data Structures & Algorithms - Set 1",
            "description": "Trees < Graphs",
            "semester": 6,
            "department": "CS",
            "questionIds": [id]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let set_id = set["id"].as_i64().unwrap();

    let set: Value = client
        .get(format!("{}/api/question-sets/{}", address, set_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(set["name"], "Data Structures & Algorithms - Set 1");
    assert_eq!(set["description"], "Trees < Graphs");
    assert_eq!(set["questions"][0]["optionA"], "<div>");
}

#[tokio::test]
async fn invalid_question_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/questions", address))
        .json(&json!({
            "questionText": "Pick one",
            "optionA": "a",
            "optionB": "b",
            "optionC": "c",
            "optionD": "d",
            "correctOption": "E",
            "semester": 9,
            "department": "CS"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn question_set_membership_is_unique() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/question-sets", address))
        .json(&json!({
            "name": "Mixed",
            "semester": 6,
            "department": "CS",
            "questionIds": [1, 1]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let set: Value = response.json().await.unwrap();
    let set_id = set["id"].as_i64().unwrap();
    assert_eq!(set["questions"].as_array().unwrap().len(), 1);

    let add = |question_id: i64| {
        client
            .post(format!(
                "{}/api/question-sets/{}/questions/{}",
                address, set_id, question_id
            ))
            .send()
    };
    add(2).await.unwrap();
    let set: Value = add(2).await.unwrap().json().await.unwrap();
    assert_eq!(set["questions"].as_array().unwrap().len(), 2);

    let set: Value = client
        .delete(format!("{}/api/question-sets/{}/questions/1", address, set_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(set["questions"][0]["id"], 2);

    let response = client
        .post(format!("{}/api/question-sets", address))
        .json(&json!({
            "name": "Broken",
            "semester": 6,
            "department": "CS",
            "questionIds": [404]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn start_hides_answer_key() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = start_test(&client, &address, start_body("1MS22CS023", 6)).await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["session"]["status"], "IN_PROGRESS");
    assert_eq!(body["session"]["department"], "CS");
    assert_eq!(body["session"]["yearOfAdmission"], "22");
    assert_eq!(body["session"]["answers"], "{}");

    let questions = body["questionSet"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q.get("correctOption").is_none()));
}

#[tokio::test]
async fn start_rejects_ineligible_students() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Malformed USN
    let response = start_test(&client, &address, start_body("1MS22", 6)).await;
    assert_eq!(response.status().as_u16(), 400);

    // Padded USN is not trimmed into validity
    let response = start_test(&client, &address, start_body(" 1MS22CS023", 6)).await;
    assert_eq!(response.status().as_u16(), 400);

    // Wrong semester
    let response = start_test(&client, &address, start_body("1MS22CS023", 5)).await;
    assert_eq!(response.status().as_u16(), 400);

    // Wrong department
    let response = start_test(&client, &address, start_body("1MS22EC023", 6)).await;
    assert_eq!(response.status().as_u16(), 400);

    // Unknown question set
    let mut body = start_body("1MS22CS023", 6);
    body["questionSetId"] = json!(99);
    let response = start_test(&client, &address, body).await;
    assert_eq!(response.status().as_u16(), 404);

    // Nothing was created
    let sessions: Value = client
        .get(format!("{}/api/test-sessions", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(sessions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn start_reports_unreachable_question_service() {
    // Port 9 (discard) is not listening.
    let address = spawn_app_with(ServiceRole::Test, Some("http://127.0.0.1:9")).await;
    let client = reqwest::Client::new();

    let response = start_test(&client, &address, start_body("1MS22CS023", 6)).await;
    assert_eq!(response.status().as_u16(), 502);
}

#[tokio::test]
async fn completed_sessions_reject_changes() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = start_test(&client, &address, start_body("1MS22CS023", 6))
        .await
        .json()
        .await
        .unwrap();
    let id = body["session"]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/api/test-sessions/{}/submit", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = answer(&client, &address, id, 1, "A").await;
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .post(format!("{}/api/test-sessions/{}/submit", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = answer(&client, &address, 9999, 1, "A").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn full_exam_flow_produces_one_result() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Start
    let body: Value = start_test(&client, &address, start_body("1MS22CS023", 6))
        .await
        .json()
        .await
        .unwrap();
    let id = body["session"]["id"].as_i64().unwrap();

    // Answer, changing our mind once
    answer(&client, &address, id, 1, "A").await;
    answer(&client, &address, id, 1, "B").await;
    answer(&client, &address, id, 2, "X").await;
    let session: Value = answer(&client, &address, id, 3, "A").await.json().await.unwrap();
    let answers: Value = serde_json::from_str(session["answers"].as_str().unwrap()).unwrap();
    assert_eq!(answers, json!({"1": "B", "2": "X", "3": "A"}));

    // Submit, which grades through the marks service
    let submitted: Value = client
        .post(format!("{}/api/test-sessions/{}/submit", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submitted["status"], "COMPLETED");
    assert!(submitted["submittedAt"].is_string());

    let response = client
        .get(format!("{}/api/marks/test-session/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["totalQuestions"], 3);
    assert_eq!(result["correctAnswers"], 2);
    assert_eq!(result["wrongAnswers"], 1);
    assert_eq!(result["score"], 2);
    assert!((result["percentage"].as_f64().unwrap() - 66.67).abs() < 0.01);

    // Recalculating returns the same row
    let response = client
        .post(format!("{}/api/marks/calculate", address))
        .json(&json!({ "testSessionId": id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let again: Value = response.json().await.unwrap();
    assert_eq!(again, result);

    let results: Value = client
        .get(format!("{}/api/marks/usn/1MS22CS023", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);

    // Dashboards
    let stats: Value = client
        .get(format!("{}/api/marks/dashboard/department/cs", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalTests"], 1);
    assert_eq!(stats["highestScore"], 2);
    assert_eq!(stats["lowestScore"], 2);

    let stats: Value = client
        .get(format!("{}/api/marks/dashboard/semester/5", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalTests"], 0);
    assert_eq!(stats["averagePercentage"], 0.0);
}

#[tokio::test]
async fn calculate_for_unknown_session_is_not_found() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/marks/calculate", address))
        .json(&json!({ "testSessionId": 12345 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .get(format!("{}/api/marks/test-session/12345", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn question_role_only_mounts_question_routes() {
    let address = spawn_app_with(ServiceRole::Question, None).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/question-sets/1", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let set: Value = response.json().await.unwrap();
    assert_eq!(set["name"], "Data Structures & Algorithms - Set 1");
    assert_eq!(set["questions"][0]["correctOption"], "B");

    let response = client
        .get(format!("{}/api/marks/dashboard", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
