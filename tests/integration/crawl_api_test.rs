// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;
use uuid::Uuid;

use crate::helpers::test_app;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_crawl(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/crawl")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// 提交成功返回任务ID，任务以Pending状态可查
#[tokio::test]
async fn submit_creates_pending_job() {
    let (app, store, queue) = test_app(None);

    let response = app
        .clone()
        .oneshot(post_crawl(
            r#"{"urls": ["https://a.example", "https://b.example"], "priority": 5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    let task_id: Uuid = value["task_id"].as_str().unwrap().parse().unwrap();

    // Pending before any worker picks it up
    let job = store.get(&task_id).unwrap();
    assert_eq!(job.status.to_string(), "pending");
    assert_eq!(job.priority, 5);
    assert_eq!(queue.len(), 1);

    // And the status endpoint agrees
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/task/{task_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["status"], "pending");
    assert!(snapshot.get("result").is_none());
}

/// 单个URL字符串也被接受
#[tokio::test]
async fn submit_accepts_single_url_string() {
    let (app, store, _queue) = test_app(None);

    let response = app
        .oneshot(post_crawl(r#"{"urls": "https://example.com"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len(), 1);
}

/// 空URL列表返回400，存储保持干净
#[tokio::test]
async fn submit_rejects_empty_urls() {
    let (app, store, queue) = test_app(None);

    let response = app.oneshot(post_crawl(r#"{"urls": []}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
    assert!(queue.is_empty());
}

/// 语法非法的URL返回400
#[tokio::test]
async fn submit_rejects_malformed_url() {
    let (app, store, _queue) = test_app(None);

    let response = app
        .oneshot(post_crawl(r#"{"urls": ["https://ok.example", "not a url"]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await;
    assert!(value["error"].as_str().unwrap().contains("invalid url"));
    assert!(store.is_empty());
}

/// 非http(s)方案返回400
#[tokio::test]
async fn submit_rejects_unsupported_scheme() {
    let (app, store, _queue) = test_app(None);

    let response = app
        .oneshot(post_crawl(r#"{"urls": "file:///etc/passwd"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
}

/// 坏的提取模式在提交时就被拒绝
#[tokio::test]
async fn submit_rejects_invalid_schema() {
    let (app, store, _queue) = test_app(None);

    let response = app
        .oneshot(post_crawl(
            r#"{"urls": "https://example.com",
                "schema": {"name": "x", "base_selector": null,
                           "fields": [{"name": "t", "selector": "h1[["}]}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
}

/// 未知任务ID返回404
#[tokio::test]
async fn unknown_task_id_is_404() {
    let (app, _store, _queue) = test_app(None);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/task/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A malformed id behaves the same as an unknown one
    let response = app
        .oneshot(
            Request::builder()
                .uri("/task/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Pending任务可以取消，取消后不可见
#[tokio::test]
async fn pending_job_can_be_cancelled() {
    let (app, store, queue) = test_app(None);

    let response = app
        .clone()
        .oneshot(post_crawl(r#"{"urls": "https://example.com"}"#))
        .await
        .unwrap();
    let task_id = body_json(response).await["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/task/{task_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.is_empty());
    assert!(queue.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/task/{task_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 已被认领的任务不能取消，返回409
#[tokio::test]
async fn claimed_job_cannot_be_cancelled() {
    let (app, _store, queue) = test_app(None);

    let response = app
        .clone()
        .oneshot(post_crawl(r#"{"urls": "https://example.com"}"#))
        .await
        .unwrap();
    let task_id = body_json(response).await["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Simulate a worker claiming the job
    assert!(queue.try_pop().is_some());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/task/{task_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
