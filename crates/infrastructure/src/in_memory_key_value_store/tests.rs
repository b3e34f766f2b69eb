use std::sync::Arc;
use std::time::Duration;

use coursehub_application::{CacheService, KeyTtl, KeyValueStore, RateLimitService};
use coursehub_core::AppError;
use coursehub_domain::RateLimitRule;

use crate::InMemoryRateLimitWindowStore;

use super::InMemoryKeyValueStore;

#[tokio::test(start_paused = true)]
async fn entries_vanish_after_their_ttl() {
    let store = InMemoryKeyValueStore::new();
    assert!(
        store
            .set("course:cloud", "{}", Some(Duration::from_secs(300)))
            .await
            .is_ok()
    );

    tokio::time::advance(Duration::from_secs(299)).await;
    assert_eq!(
        store.get("course:cloud").await.unwrap_or_default().as_deref(),
        Some("{}")
    );
    assert!(matches!(
        store.ttl("course:cloud").await,
        Ok(KeyTtl::ExpiresIn(remaining)) if remaining == Duration::from_secs(1)
    ));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(store.get("course:cloud").await.unwrap_or_default().is_none());
    assert!(!store.exists("course:cloud").await.unwrap_or(true));
    assert!(matches!(
        store.ttl("course:cloud").await,
        Ok(KeyTtl::Missing)
    ));
}

#[tokio::test]
async fn set_rejects_zero_ttl_and_keeps_persistent_values() {
    let store = InMemoryKeyValueStore::new();

    let zero = store.set("k", "v", Some(Duration::ZERO)).await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    assert!(store.set("k", "v", None).await.is_ok());
    assert!(matches!(store.ttl("k").await, Ok(KeyTtl::Persistent)));
}

#[tokio::test(start_paused = true)]
async fn increment_keeps_expiry_and_restarts_after_it() {
    let store = InMemoryKeyValueStore::new();

    assert!(matches!(store.increment("ratelimit:x").await, Ok(1)));
    assert!(matches!(store.ttl("ratelimit:x").await, Ok(KeyTtl::Persistent)));
    assert!(matches!(
        store.expire("ratelimit:x", Duration::from_secs(60)).await,
        Ok(true)
    ));
    assert!(matches!(store.increment("ratelimit:x").await, Ok(2)));
    assert!(matches!(
        store.ttl("ratelimit:x").await,
        Ok(KeyTtl::ExpiresIn(_))
    ));

    tokio::time::advance(Duration::from_secs(60)).await;
    assert!(matches!(store.increment("ratelimit:x").await, Ok(1)));
}

#[tokio::test]
async fn increment_rejects_non_numeric_values() {
    let store = InMemoryKeyValueStore::new();
    assert!(store.set("k", "hello", None).await.is_ok());

    assert!(matches!(
        store.increment("k").await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn increment_window_opens_the_window_once() {
    let store = InMemoryKeyValueStore::new();
    let window = Duration::from_secs(60);

    assert!(matches!(
        store.increment_window("ratelimit:w", window).await,
        Ok((1, remaining)) if remaining == window
    ));

    tokio::time::advance(Duration::from_secs(20)).await;
    assert!(matches!(
        store.increment_window("ratelimit:w", window).await,
        Ok((2, remaining)) if remaining == Duration::from_secs(40)
    ));

    tokio::time::advance(Duration::from_secs(40)).await;
    assert!(matches!(
        store.increment_window("ratelimit:w", window).await,
        Ok((1, remaining)) if remaining == window
    ));

    assert!(store.set("ratelimit:stuck", "4", None).await.is_ok());
    assert!(matches!(
        store.increment_window("ratelimit:stuck", window).await,
        Ok((5, remaining)) if remaining == window
    ));
    assert!(matches!(
        store.increment_window("ratelimit:zero", Duration::ZERO).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn concurrent_window_hits_share_one_expiry() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let window = Duration::from_secs(60);

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.increment_window("ratelimit:burst", window).await })
        })
        .collect();

    let mut counts = Vec::new();
    for task in tasks {
        match task.await {
            Ok(Ok((count, remaining))) => {
                assert!(remaining <= window);
                counts.push(count);
            }
            _ => panic!("window increment failed"),
        }
    }
    counts.sort_unstable();

    assert_eq!(counts, (1..=32).collect::<Vec<i64>>());
    assert!(matches!(
        store.ttl("ratelimit:burst").await,
        Ok(KeyTtl::ExpiresIn(remaining)) if remaining <= window
    ));
}

#[tokio::test]
async fn expire_on_missing_key_reports_false() {
    let store = InMemoryKeyValueStore::new();
    assert!(matches!(
        store.expire("missing", Duration::from_secs(5)).await,
        Ok(false)
    ));

    assert!(store.set("k", "v", None).await.is_ok());
    assert!(matches!(store.expire("k", Duration::ZERO).await, Ok(true)));
    assert!(!store.exists("k").await.unwrap_or(true));
}

#[tokio::test(start_paused = true)]
async fn keys_and_delete_ignore_expired_entries() {
    let store = InMemoryKeyValueStore::new();
    for key in ["courses:list", "course:cloud", "course:devsecops"] {
        assert!(store.set(key, "[]", None).await.is_ok());
    }
    assert!(
        store
            .set("course:stale", "{}", Some(Duration::from_secs(1)))
            .await
            .is_ok()
    );
    tokio::time::advance(Duration::from_secs(2)).await;

    let keys = store.keys("course:*").await.unwrap_or_default();
    assert_eq!(keys, vec!["course:cloud", "course:devsecops"]);

    let removed = store
        .delete(&[
            "course:cloud".to_owned(),
            "course:stale".to_owned(),
            "course:unknown".to_owned(),
        ])
        .await;
    assert!(matches!(removed, Ok(1)));
    assert!(store.ping().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn cached_values_expire_through_the_facade() {
    let cache = CacheService::new(Arc::new(InMemoryKeyValueStore::new()));
    let mut calls = 0;

    for _ in 0..2 {
        let value: Result<u32, AppError> = cache
            .get_cached("k", Duration::from_secs(300), || {
                calls += 1;
                async { Ok(7) }
            })
            .await;
        assert!(matches!(value, Ok(7)));
    }
    assert_eq!(calls, 1);

    tokio::time::advance(Duration::from_secs(301)).await;
    let value: Result<u32, AppError> = cache
        .get_cached("k", Duration::from_secs(300), || {
            calls += 1;
            async { Ok(7) }
        })
        .await;
    assert!(matches!(value, Ok(7)));
    assert_eq!(calls, 2);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_window_resets_in_shared_store() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let service = RateLimitService::new(Arc::new(InMemoryRateLimitWindowStore::new()))
        .with_shared_store(store.clone());
    let rule = RateLimitRule::per_minute("x", 5).unwrap_or_else(|_| unreachable!());

    let mut remaining = Vec::new();
    for _ in 0..5 {
        let decision = service.check_rate_limit(&rule, "x").await;
        assert!(decision.allowed);
        remaining.push(decision.remaining);
    }
    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);
    assert!(!service.check_rate_limit(&rule, "x").await.allowed);

    tokio::time::advance(Duration::from_secs(60)).await;
    let fresh = service.check_rate_limit(&rule, "x").await;
    assert!(fresh.allowed);
    assert_eq!(fresh.remaining, 4);
    assert_eq!(store.get("ratelimit:x").await.unwrap_or_default().as_deref(), Some("1"));
}
