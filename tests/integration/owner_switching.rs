//! Integration tests: switching owners through the application layer.
//!
//! Drives `App` over HTTP against an in-process server with several owners
//! sharing it, and checks that every visible task belongs to the current
//! owner.

use std::time::Duration;

use taskboard::app::{App, Flow, NoticeLevel};
use taskboard::filter::{StatusFilter, TagMatch};
use taskboard::service::http::HttpService;
use taskboard::service::local::LocalService;
use taskboard::store::{StoreOptions, TaskStore};
use taskboard_proto::task::TaskStatus;

async fn start_app(owner: &str) -> (App<HttpService>, tokio::task::JoinHandle<()>) {
    let (addr, handle) = taskboard_server::api::start_server("127.0.0.1:0")
        .await
        .expect("failed to start server");
    let service = HttpService::new(&format!("http://{addr}"), Some(Duration::from_secs(5)))
        .expect("valid url");
    let store = TaskStore::new(service, owner, StoreOptions::default());
    (App::new(store, TagMatch::Any), handle)
}

fn titles<S: taskboard::service::TaskService>(app: &App<S>) -> Vec<String> {
    app.visible().into_iter().map(|t| t.title).collect()
}

#[tokio::test]
async fn visible_list_is_scoped_to_current_owner() {
    let (mut app, _handle) = start_app("alice").await;
    app.add("Alice 1", "", &[]).await.unwrap();
    app.add("Alice 2", "", &[]).await.unwrap();

    assert!(app.switch_owner("bob").await);
    assert!(titles(&app).is_empty());
    app.add("Bob 1", "", &[]).await.unwrap();
    assert_eq!(titles(&app), vec!["Bob 1"]);

    assert!(app.switch_owner("alice").await);
    assert_eq!(titles(&app), vec!["Alice 1", "Alice 2"]);
    assert!(app.visible().iter().all(|t| t.owner == "alice"));
}

#[tokio::test]
async fn switching_owner_resets_criteria() {
    let (mut app, _handle) = start_app("alice").await;
    app.add("Report", "", &["work".to_string()]).await.unwrap();
    app.criteria_mut().status = StatusFilter::Only(TaskStatus::Completed);
    app.criteria_mut().toggle_tag("work");
    assert!(titles(&app).is_empty());

    app.switch_owner("carol").await;
    assert!(app.criteria().is_empty());
    app.switch_owner("alice").await;
    assert_eq!(titles(&app), vec!["Report"]);
}

#[tokio::test]
async fn shell_user_command_switches_owner() {
    let (mut app, _handle) = start_app("alice").await;
    app.run_line("add \"Alice task\"").await;
    app.run_line("filter -q alice").await;

    assert_eq!(app.run_line("user bob").await, Flow::Continue(String::new()));
    let notice = app.take_notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(app.store().owner(), "bob");
    assert!(app.criteria().is_empty());

    let Flow::Continue(listing) = app.run_line("list").await else {
        panic!("expected output");
    };
    assert_eq!(listing, "No tasks.");
}

#[tokio::test]
async fn mutation_failure_keeps_session_usable() {
    let (mut app, handle) = start_app("alice").await;
    app.add("Keep me", "", &[]).await.unwrap();

    // Unknown tag is rejected locally.
    assert!(app.add("Bad", "", &["nope".to_string()]).await.is_none());
    assert_eq!(app.take_notice().unwrap().level, NoticeLevel::Error);

    // Unknown id never reaches the store.
    assert!(!app.remove("no-such-task").await);
    assert_eq!(app.take_notice().unwrap().level, NoticeLevel::Error);

    assert_eq!(titles(&app), vec!["Keep me"]);
    handle.abort();
}

#[tokio::test]
async fn offline_service_shares_owners_in_one_session() {
    let store = TaskStore::new(LocalService::new(), "alice", StoreOptions::default());
    let mut app = App::new(store, TagMatch::Any);
    app.add("Local", "", &[]).await.unwrap();
    app.switch_owner("bob").await;
    assert!(titles(&app).is_empty());
    app.switch_owner("alice").await;
    assert_eq!(titles(&app), vec!["Local"]);
}
