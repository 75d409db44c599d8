//! Regression coverage for post use-cases.

use super::*;
use crate::outbound::memory::{InMemoryCategoryRepository, InMemoryPostRepository};

fn service() -> PostService {
    PostService::new(
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryCategoryRepository::seeded()),
    )
}

fn valid_input() -> Map<String, Value> {
    let mut input = Map::new();
    input.insert("title".into(), json!("Hello World!"));
    input.insert(
        "content".into(),
        json!("<p>Intro paragraph with <em>markup</em>.</p>"),
    );
    input.insert("user_id".into(), json!(1));
    input.insert("category_id".into(), json!(4));
    input
}

fn field_errors(err: &DomainError) -> Map<String, Value> {
    err.details()
        .get("errors")
        .and_then(Value::as_object)
        .cloned()
        .expect("errors detail")
}

#[tokio::test]
async fn create_derives_slug_and_excerpt() {
    let service = service();
    let post = service.create(valid_input()).await.expect("create");
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.excerpt.as_deref(), Some("Intro paragraph with markup."));
    assert!(!post.is_published);
    assert!(post.published_at.is_none());
}

#[tokio::test]
async fn publishing_via_coerced_flag_stamps_timestamp() {
    let service = service();
    let mut input = valid_input();
    input.insert("is_published".into(), json!("yes"));

    let post = service.create(input).await.expect("create");
    assert!(post.is_published);
    assert!(post.published_at.is_some());
}

#[tokio::test]
async fn explicit_published_at_requires_published_flag() {
    let service = service();
    let mut input = valid_input();
    input.insert("published_at".into(), json!("2026-01-01T00:00:00Z"));

    let err = service.create(input).await.expect_err("cross rule");
    assert!(field_errors(&err).contains_key("published_at"));
}

#[tokio::test]
async fn publish_and_unpublish_round_trip() {
    let service = service();
    let post = service.create(valid_input()).await.expect("create");

    let published = service.publish(post.id).await.expect("publish");
    assert!(published.is_published);
    let stamped = published.published_at.expect("timestamp set");

    let republished = service.publish(post.id).await.expect("publish again");
    assert_eq!(
        republished.published_at,
        Some(stamped),
        "publish is idempotent for the timestamp"
    );

    let unpublished = service.unpublish(post.id).await.expect("unpublish");
    assert!(!unpublished.is_published);
    assert!(unpublished.published_at.is_none());
}

#[tokio::test]
async fn published_posts_cannot_be_deleted() {
    let service = service();
    let post = service.create(valid_input()).await.expect("create");
    service.publish(post.id).await.expect("publish");

    let err = service.delete(post.id).await.expect_err("still published");
    assert_eq!(err.code(), "GENERIC_ERROR");
    assert_eq!(err.status_code(), 409);

    service.unpublish(post.id).await.expect("unpublish");
    service.delete(post.id).await.expect("delete after unpublish");
}

#[tokio::test]
async fn unknown_posts_fall_back_to_generic_not_found() {
    let service = service();
    let err = service.get(404).await.expect_err("unknown id");
    assert_eq!(err.code(), "RESOURCE_NOT_FOUND");
    assert_eq!(err.status_code(), 404);
    assert!(err.message().contains("Post"));
}

#[tokio::test]
async fn invalid_timestamp_is_reported_by_pattern_rule() {
    let service = service();
    let mut input = valid_input();
    input.insert("is_published".into(), json!(true));
    input.insert("published_at".into(), json!("yesterday"));

    let err = service.create(input).await.expect_err("bad timestamp");
    assert!(field_errors(&err).contains_key("published_at"));
}

#[tokio::test]
async fn update_keeps_excerpt_in_sync_with_content() {
    let service = service();
    let post = service.create(valid_input()).await.expect("create");

    let mut changes = Map::new();
    changes.insert("content".into(), json!("New body text"));
    let updated = service.update(post.id, changes).await.expect("update");
    assert_eq!(updated.excerpt.as_deref(), Some("New body text"));
}

#[tokio::test]
async fn negative_user_filter_is_rejected() {
    let service = service();
    let err = service
        .list(&PostFilter::User(-1))
        .await
        .expect_err("negative id");
    assert_eq!(err.code(), "VALIDATION_ERROR");
}
