use std::sync::Arc;

use agent_core::{Agent, Context, Error, Result};
use agent_server::{AppState, build_router};
use agent_team::{RoundRobinTeam, TeamFactory, TextMentionTermination};
use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};
use tokio::time::{Duration, sleep, timeout};

struct Scripted {
    name: &'static str,
    reply: String,
}

#[async_trait]
impl Agent for Scripted {
    async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct Failing;

#[async_trait]
impl Agent for Failing {
    async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
        Err(Error::ProcessingFailed("model unreachable".to_string()))
    }

    fn name(&self) -> &str {
        "Search_Agent"
    }
}

fn scripted(name: &'static str, reply: impl Into<String>) -> Arc<dyn Agent> {
    Arc::new(Scripted {
        name,
        reply: reply.into(),
    })
}

fn server_with(factory: Option<Arc<dyn TeamFactory>>, output_dir: &std::path::Path) -> TestServer {
    TestServer::new(build_router(AppState::new(factory, output_dir))).unwrap()
}

fn working_factory(output_dir: &std::path::Path) -> Arc<dyn TeamFactory> {
    let chart = json!({
        "stock_code": "AAPL",
        "plot_file_path": output_dir.join("charts").join("AAPL.png"),
    })
    .to_string();
    Arc::new(move || {
        RoundRobinTeam::builder()
            .agent(scripted("Task_Analysis_Agent", "Find Apple"))
            .agent(scripted("Search_Agent", "AAPL"))
            .agent(scripted("Plotting_Agent", chart.clone()))
            .agent(scripted("Report_Agent", "Buy. TERMINATE"))
            .agent(scripted("OutputAgent", "Saved. TERMINATE"))
            .max_turns(5)
            .termination(TextMentionTermination::default().with_sources(["OutputAgent"]))
            .build()
    })
}

fn failing_factory() -> Arc<dyn TeamFactory> {
    Arc::new(|| {
        RoundRobinTeam::builder()
            .agent(scripted("Task_Analysis_Agent", "Find Apple"))
            .agent(Arc::new(Failing))
            .max_turns(5)
            .build()
    })
}

async fn submit(server: &TestServer, task: &str) -> String {
    let response = server.post("/api/tasks").json(&json!({ "task": task })).await;
    assert_eq!(response.status_code(), 200);
    response.json::<Value>()["taskId"]
        .as_str()
        .expect("task id missing")
        .to_string()
}

async fn wait_for_status(server: &TestServer, id: &str, wanted: &str) -> Value {
    timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = server.get(&format!("/api/tasks/{id}")).await.json::<Value>();
            if snapshot["status"] == wanted {
                return snapshot;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("task did not reach the expected status in time")
}

#[tokio::test]
async fn blank_or_missing_task_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(None, dir.path());

    for body in [json!({ "task": "   " }), json!({}), json!({ "task": 42 })] {
        let response = server.post("/api/tasks").json(&body).await;
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "task is required" }));
    }

    let response = server.post("/api/tasks").text("not json").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn submitted_task_waits_for_a_stream() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(Some(working_factory(dir.path())), dir.path());

    let id = submit(&server, "分析苹果公司").await;
    assert!(uuid_like(&id));

    let snapshot = server.get(&format!("/api/tasks/{id}")).await.json::<Value>();
    assert_eq!(snapshot["status"], "created");
    assert_eq!(snapshot["task"], "分析苹果公司");
    assert_eq!(snapshot["progress"], 0.0);

    let listed = server.get("/api/tasks").await.json::<Value>();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let response = server.get(&format!("/api/tasks/{id}/results")).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>(), json!({ "error": "task not completed" }));
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(None, dir.path());

    for path in [
        "/api/tasks/nope",
        "/api/tasks/nope/results",
        "/api/tasks/nope/stream",
    ] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<Value>(), json!({ "error": "task not found" }));
    }
}

#[tokio::test]
async fn stream_runs_the_team_and_closes_with_done() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(Some(working_factory(dir.path())), dir.path());
    let id = submit(&server, "analyse AAPL").await;

    let response = server.get(&format!("/api/tasks/{id}/stream")).await;
    assert_eq!(response.status_code(), 200);
    let body = response.text();

    assert!(body.starts_with("event: progress"), "{body}");
    for panel in ["taskAgent", "searchAgent", "chartAgent", "commentAgent", "log"] {
        assert!(body.contains(&format!("event: {panel}")), "missing {panel}: {body}");
    }
    assert!(body.contains("/files/charts/AAPL.png"), "{body}");
    assert!(body.trim_end().contains("event: done"), "{body}");
    assert!(!body.contains("event: error"), "{body}");

    let snapshot = wait_for_status(&server, &id, "completed").await;
    assert_eq!(snapshot["progress"], 1.0);

    let results = server.get(&format!("/api/tasks/{id}/results")).await;
    assert_eq!(results.status_code(), 200);
    let results = results.json::<Value>();
    assert_eq!(results["task_id"], id.as_str());
    assert_eq!(results["task_description"], "analyse AAPL");
    assert_eq!(results["final_result"], "Saved. TERMINATE");
    assert_eq!(results["stop_reason"], "Text 'TERMINATE' mentioned");

    // A late subscriber gets the replay and the terminal event
    let replay = server.get(&format!("/api/tasks/{id}/stream")).await.text();
    assert!(replay.contains("event: searchAgent"), "{replay}");
    assert!(replay.contains("event: done"), "{replay}");
}

#[tokio::test]
async fn failing_agent_ends_stream_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(Some(failing_factory()), dir.path());
    let id = submit(&server, "analyse AAPL").await;

    let body = server.get(&format!("/api/tasks/{id}/stream")).await.text();
    assert!(body.contains("event: taskAgent"), "{body}");
    assert!(body.contains("event: error"), "{body}");
    assert!(body.contains("model unreachable"), "{body}");

    let snapshot = wait_for_status(&server, &id, "failed").await;
    assert!(
        snapshot["error"]
            .as_str()
            .is_some_and(|e| e.contains("model unreachable"))
    );
}

#[tokio::test]
async fn missing_team_fails_task_on_stream() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(None, dir.path());
    let id = submit(&server, "analyse AAPL").await;

    let body = server.get(&format!("/api/tasks/{id}/stream")).await.text();
    assert!(body.contains("event: error"), "{body}");
    assert!(body.contains("agent team is not initialized"), "{body}");
    wait_for_status(&server, &id, "failed").await;
}

#[tokio::test]
async fn health_reports_team_and_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(None, dir.path());
    submit(&server, "one").await;

    let health = server.get("/api/health").await;
    assert_eq!(health.status_code(), 200);
    let health = health.json::<Value>();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["agent_team_initialized"], false);
    assert_eq!(health["active_tasks"], 1);
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
    assert!(health["timestamp"].is_string());
}

#[tokio::test]
async fn output_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("reports")).unwrap();
    std::fs::write(dir.path().join("reports").join("r.md"), "# Report").unwrap();
    let server = server_with(None, dir.path());

    let response = server.get("/files/reports/r.md").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "# Report");
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}
