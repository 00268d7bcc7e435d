//! End-to-end behaviour of the page routes over the file store.

use std::sync::Arc;

use axum::http::StatusCode;
use context_server::pages::FilePageStore;

mod common;

#[tokio::test]
async fn save_then_view_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FilePageStore::new(dir.path()));
    let server = common::start_server_with_store(common::config_with_work_ms(1), store).await;
    let client = common::client();

    // Redirect from /save lands on /view.
    let res = client
        .post(server.url("/save/Welcome"))
        .form(&[("body", "first page")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.url().path(), "/view/Welcome");
    assert!(res.text().await.unwrap().contains("first page"));

    let on_disk = std::fs::read_to_string(dir.path().join("Welcome.txt")).unwrap();
    assert_eq!(on_disk, "first page");

    server.shutdown.trigger();
}

#[tokio::test]
async fn viewing_missing_page_lands_on_edit_form() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FilePageStore::new(dir.path()));
    let server = common::start_server_with_store(common::config_with_work_ms(1), store).await;

    let res = common::client().get(server.url("/view/Nothing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.url().path(), "/edit/Nothing");
    assert!(res.text().await.unwrap().contains("Editing Nothing"));

    server.shutdown.trigger();
}

#[tokio::test]
async fn path_traversal_titles_are_rejected() {
    let server = common::start_server(common::config_with_work_ms(1)).await;

    let res = common::client().get(server.url("/view/..%2Fsecret")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.shutdown.trigger();
}
