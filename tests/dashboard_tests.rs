//! Integration tests for the web dashboard.
//!
//! Each test binds the server to an ephemeral port and talks plain HTTP/1.1
//! over a TCP socket.

use project_dashboard::config::{DataConfig, DisplayConfig};
use project_dashboard::dashboard::start_server;
use project_dashboard::data::DatasetStore;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const PROJECTS: &str = "Project ID,Project Key,Status,Priority\n\
Water Supply,PRJ-1,Open,High\n\
Roads,PRJ-2,Closed,Low\n";

const TASKS: &str = "Task ID,Task Subject,Project Key,Parent Task\n\
T-100,Survey sites,PRJ-1,\n\
T-101,Drill borewell,PRJ-1,T-100\n\
T-200,Grade road,PRJ-2,\n\
T-900,Newsletter,,\n";

fn setup_store() -> (TempDir, Arc<DatasetStore>) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let projects_path = dir.path().join("projects.csv");
    let tasks_path = dir.path().join("tasks.csv");
    fs::write(&projects_path, PROJECTS).unwrap();
    fs::write(&tasks_path, TASKS).unwrap();

    let config = DataConfig {
        projects_path,
        tasks_path,
        ..Default::default()
    };
    let store = DatasetStore::load(config).expect("Failed to load fixtures");
    (dir, Arc::new(store))
}

/// Issue a GET and return (status line, body).
async fn get(addr: SocketAddr, path: &str) -> (String, String) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read");
    let response = String::from_utf8_lossy(&raw).into_owned();

    let status = response.lines().next().unwrap_or_default().to_string();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

async fn serve() -> (TempDir, Arc<DatasetStore>, SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let (dir, store) = setup_store();
    let (shutdown, addr) = start_server(Arc::clone(&store), Arc::new(DisplayConfig::default()), 0)
        .await
        .expect("server should bind an ephemeral port");
    (dir, store, addr, shutdown)
}

#[tokio::test]
async fn health_reports_row_counts() {
    let (_dir, _store, addr, shutdown) = serve().await;
    let (status, body) = get(addr, "/api/health").await;
    assert!(status.contains("200"), "status: {}", status);
    assert!(body.contains("\"status\":\"healthy\""));
    assert!(body.contains("\"projects\":2"));
    assert!(body.contains("\"tasks\":4"));
    let _ = shutdown.send(());
}

#[tokio::test]
async fn index_renders_both_panes() {
    let (_dir, _store, addr, shutdown) = serve().await;
    let (status, body) = get(addr, "/").await;
    assert!(status.contains("200"));
    assert!(body.contains("Open Projects"));
    assert!(body.contains("Water Supply"));
    assert!(body.contains("T-100 | Survey sites"));
    assert!(!body.contains("{{"));
    let _ = shutdown.send(());
}

#[tokio::test]
async fn task_fragment_follows_query_selection() {
    let (_dir, _store, addr, shutdown) = serve().await;

    let (_, body) = get(addr, "/api/tasks?task=T-100+%7C+Survey+sites").await;
    assert!(body.contains("T-100 | Survey sites"));
    assert!(body.contains("Drill borewell"));
    assert!(!body.contains("Grade road"));

    let (_, body) = get(addr, "/api/tasks?status=Closed").await;
    assert!(body.contains("Grade road"));
    assert!(!body.contains("Survey sites"));

    let (_, body) = get(addr, "/api/tasks?submitted=1&show_projects=on").await;
    assert!(body.contains("Tasks view is hidden"));
    let _ = shutdown.send(());
}

#[tokio::test]
async fn selection_fragment_lists_keys_and_count() {
    let (_dir, _store, addr, shutdown) = serve().await;
    let (status, body) = get(addr, "/api/selection?task=T-100&status=Open&status=Closed").await;
    assert!(status.contains("200"));
    assert!(body.contains("<code>PRJ-1</code>"));
    assert!(body.contains("Filtered tasks: 2"));
    assert!(body.contains("status=Open&amp;status=Closed"));
    let _ = shutdown.send(());
}

#[tokio::test]
async fn view_json_exposes_keys_and_hierarchy() {
    let (_dir, _store, addr, shutdown) = serve().await;
    let (status, body) = get(addr, "/api/view?project=Water+Supply&standalone=on").await;
    assert!(status.contains("200"));

    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["resolved_keys"], serde_json::json!(["PRJ-1"]));
    assert_eq!(value["tasks"]["roots"][0]["task"]["id"], "T-100");
    assert_eq!(value["tasks"]["roots"][0]["subtasks"][0]["id"], "T-101");
    assert_eq!(value["tasks"]["standalone"][0]["id"], "T-900");
    assert_eq!(value["kpis"]["total_projects"], 2);
    let _ = shutdown.send(());
}

#[tokio::test]
async fn options_json_lists_choices() {
    let (_dir, _store, addr, shutdown) = serve().await;
    let (_, body) = get(addr, "/api/options").await;
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["project_ids"], serde_json::json!(["Roads", "Water Supply"]));
    assert_eq!(value["statuses"], serde_json::json!(["Open", "Closed"]));
    assert!(value["date_bounds"].is_null());
    let _ = shutdown.send(());
}

#[tokio::test]
async fn reload_is_visible_to_the_next_request() {
    let (_dir, store, addr, shutdown) = serve().await;

    fs::write(
        &store.config().projects_path,
        format!("{}Schools,PRJ-3,Open,Medium\n", PROJECTS),
    )
    .unwrap();
    store.reload().expect("reload");

    let (_, body) = get(addr, "/api/kpis").await;
    assert!(body.contains("<div class=\"stat-value\">3</div>"));
    let _ = shutdown.send(());
}
