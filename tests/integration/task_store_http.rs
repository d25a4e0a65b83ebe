//! Integration tests: task store against a live `taskboard-server`.
//!
//! Each test starts the server in-process on an ephemeral port and drives
//! it through `HttpService`, checking that the local mirror only changes
//! after the server confirms a mutation.

use std::sync::Arc;
use std::time::Duration;

use taskboard::service::http::HttpService;
use taskboard::service::{ServiceError, TaskService};
use taskboard::store::{StoreError, StoreOptions, TaskStore};
use taskboard_proto::task::{StatusModel, TaskId, TaskStatus, ValidationError};
use taskboard_proto::wire::{NewTask, TaskPatch};
use taskboard_server::api::{self, ServerState};

/// Start the server in-process and return its base URL and state.
async fn start_server() -> (String, Arc<ServerState>, tokio::task::JoinHandle<()>) {
    let state = Arc::new(ServerState::new());
    let (addr, handle) = api::start_server_with_state("127.0.0.1:0", Arc::clone(&state))
        .await
        .expect("failed to start server");
    (format!("http://{addr}"), state, handle)
}

fn http(url: &str) -> HttpService {
    HttpService::new(url, Some(Duration::from_secs(5))).expect("valid url")
}

fn tags(ids: &[&str]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn add_then_reload_round_trips() {
    let (url, _state, _handle) = start_server().await;
    let store = TaskStore::new(http(&url), "alice", StoreOptions::default());

    let task = store
        .add("Team meeting", "weekly sync", &tags(&["work"]))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.comments.is_empty());
    assert_eq!(task.owner, "alice");

    // A second client sees the same task after loading.
    let other = TaskStore::new(http(&url), "alice", StoreOptions::default());
    other.load_all().await.unwrap();
    assert_eq!(other.tasks(), vec![task]);
}

#[tokio::test]
async fn full_lifecycle() {
    let (url, state, _handle) = start_server().await;
    let store = TaskStore::new(http(&url), "alice", StoreOptions::default());

    let task = store.add("Write report", "", &[]).await.unwrap();

    let edited = store
        .edit(&task.id, "Write final report", "due friday", &tags(&["work", "urgent"]))
        .await
        .unwrap();
    assert_eq!(edited.title, "Write final report");

    for expected in [TaskStatus::InProgress, TaskStatus::Completed, TaskStatus::Pending] {
        let toggled = store.toggle_status(&task.id).await.unwrap();
        assert_eq!(toggled.status, expected);
    }

    let comment = store.add_comment(&task.id, "started outline").await.unwrap();
    assert_eq!(comment.text, "started outline");

    let local = store.get(&task.id).unwrap();
    assert_eq!(local.title, "Write final report");
    assert_eq!(local.description, "due friday");
    assert_eq!(local.tags, tags(&["work", "urgent"]));
    assert_eq!(local.comments, vec![comment]);

    store.remove(&task.id).await.unwrap();
    assert!(store.is_empty());
    assert_eq!(state.store.len().await, 0);
}

#[tokio::test]
async fn completed_at_follows_server() {
    let (url, _state, _handle) = start_server().await;
    let options = StoreOptions {
        status_model: StatusModel::Binary,
        ..StoreOptions::default()
    };
    let store = TaskStore::new(http(&url), "alice", options);

    let task = store.add("Flip", "", &[]).await.unwrap();
    let done = store.toggle_status(&task.id).await.unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.completed_at.is_some());
    assert_eq!(store.get(&task.id).unwrap().completed_at, done.completed_at);

    let reopened = store.toggle_status(&task.id).await.unwrap();
    assert_eq!(reopened.status, TaskStatus::Pending);
    assert!(store.get(&task.id).unwrap().completed_at.is_none());
}

#[tokio::test]
async fn server_side_deletion_surfaces_as_not_found() {
    let (url, state, _handle) = start_server().await;
    let store = TaskStore::new(http(&url), "alice", StoreOptions::default());
    let task = store.add("Ephemeral", "", &[]).await.unwrap();

    // Someone else deletes it behind our back.
    state.store.delete(&task.id).await.unwrap();

    let err = store.toggle_status(&task.id).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Service(ServiceError::NotFound(task.id.clone()))
    );
    // The mirror still holds the last confirmed state.
    assert_eq!(store.get(&task.id).unwrap().status, TaskStatus::Pending);
}

#[tokio::test]
async fn blank_comment_never_reaches_server() {
    let (url, state, _handle) = start_server().await;
    let store = TaskStore::new(http(&url), "alice", StoreOptions::default());
    let task = store.add("A", "", &[]).await.unwrap();

    assert_eq!(
        store.add_comment(&task.id, "   ").await,
        Err(StoreError::Validation(ValidationError::EmptyComment))
    );
    let stored = state.store.list(Some("alice")).await;
    assert!(stored[0].comments.is_empty());
}

#[tokio::test]
async fn server_rejects_invalid_requests() {
    let (url, _state, _handle) = start_server().await;
    let svc = http(&url);

    let err = svc
        .create(&NewTask {
            title: "A".to_string(),
            description: String::new(),
            tags: tags(&["nonexistent"]),
            owner: "alice".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::Status {
            status: 400,
            message: "unknown tag: nonexistent".to_string(),
        }
    );

    let missing = TaskId::from("missing");
    assert_eq!(
        svc.update(&missing, &TaskPatch::status(TaskStatus::Completed))
            .await
            .unwrap_err(),
        ServiceError::NotFound(missing.clone())
    );
    assert_eq!(
        svc.delete(&missing).await.unwrap_err(),
        ServiceError::NotFound(missing)
    );
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = TaskStore::new(http(&format!("http://{addr}")), "alice", StoreOptions::default());
    assert!(matches!(
        store.add("New", "", &[]).await,
        Err(StoreError::Service(ServiceError::Transport(_)))
    ));
    assert!(matches!(
        store.load_all().await,
        Err(StoreError::Service(ServiceError::Transport(_)))
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn dashboard_reflects_owner_activity() {
    let (url, _state, _handle) = start_server().await;
    let store = TaskStore::new(http(&url), "alice", StoreOptions::default());

    let a = store.add("A", "", &tags(&["work"])).await.unwrap();
    store.add("B", "", &tags(&["work", "urgent"])).await.unwrap();
    store.add("C", "", &[]).await.unwrap();
    store.toggle_status(&a.id).await.unwrap();
    store.toggle_status(&a.id).await.unwrap();

    let bob = TaskStore::new(http(&url), "bob", StoreOptions::default());
    bob.add("Bob's", "", &tags(&["personal"])).await.unwrap();

    let d = store.dashboard().await.unwrap();
    assert_eq!(d.status.pending, 2);
    assert_eq!(d.status.completed, 1);
    assert_eq!(d.status.total(), 3);
    assert_eq!(d.by_day.len(), 1);
    assert_eq!(d.by_day[0].count, 1);
    assert_eq!(d.top_tags[0].label, "Work");
    assert_eq!(d.top_tags[0].count, 2);
    assert!(d.top_tags.iter().all(|t| t.label != "Personal"));
    assert!(d.weekly_completion_rate > 0.0);
}

#[tokio::test]
async fn concurrent_toggles_on_one_task_are_serialized() {
    let (url, _state, _handle) = start_server().await;
    let store = Arc::new(TaskStore::new(http(&url), "alice", StoreOptions::default()));
    let task = store.add("Contended", "", &[]).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..3 {
        let store = Arc::clone(&store);
        let id = task.id.clone();
        handles.push(tokio::spawn(async move { store.toggle_status(&id).await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    // Three serialized steps through the cycle end where they started.
    assert_eq!(store.get(&task.id).unwrap().status, TaskStatus::Pending);
}
