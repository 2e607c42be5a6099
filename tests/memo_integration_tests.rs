//! Integration Tests for the Memoizer
//!
//! Exercises the public API end to end against the in-memory store.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use redis_memo::{
    args, callable_name, Args, Json, KeyValueStore, MemoError, Memoizer, MemoryStore, Value,
};
use serde::{Deserialize, Serialize};
use tokio_test::{assert_err, assert_ok};

// == Helper Functions ==

fn counting<R>(
    calls: &Arc<AtomicUsize>,
    result: R,
) -> impl Fn(Args) -> std::future::Ready<Result<R, Infallible>> + Send + Sync
where
    R: Clone + Send + Sync,
{
    let calls = Arc::clone(calls);
    move |_args: Args| {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(result.clone()))
    }
}

// == Scenario: f(a) -> 5 ==

#[tokio::test]
async fn test_cold_warm_and_key_inspection() {
    let store = MemoryStore::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let f = Memoizer::new(store.clone()).wrap(callable_name!(f), counting(&calls, 5));

    // Cold
    let first = assert_ok!(f.call(args![10]).await);
    assert_eq!(first, Value::Int(5));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let key = f.get_cache_key(&args![10]);
    assert!(key.starts_with("memo_integration_tests::f:int:10:"));
    assert_eq!(assert_ok!(store.get(&key).await).as_deref(), Some("5"));

    // Warm
    let second = assert_ok!(f.call(args![10]).await);
    assert_eq!(second, first);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Inspection is stable
    assert_eq!(f.get_cache_key(&args![10]), key);
}

#[tokio::test]
async fn test_different_arguments_are_cached_separately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let f = Memoizer::new(MemoryStore::new()).wrap("app::lookup", counting(&calls, "x"));

    assert_ok!(f.call(args![1]).await);
    assert_ok!(f.call(args!["1"]).await);
    assert_ok!(f.call(args![1].named("verbose", true)).await);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    assert_ok!(f.call(args![1]).await);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_wrappers_with_different_identities_do_not_collide() {
    let store = MemoryStore::new();
    let memoizer = Memoizer::new(store.clone());
    let a = memoizer.wrap("app::a", |_args: Args| async { Ok::<_, Infallible>("a") });
    let b = memoizer.wrap("app::b", |_args: Args| async { Ok::<_, Infallible>("b") });

    assert_eq!(assert_ok!(a.call(args![1]).await), Value::Text("a".into()));
    assert_eq!(assert_ok!(b.call(args![1]).await), Value::Text("b".into()));
    assert_eq!(store.len().await, 2);
}

// == TTL Expiry ==

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let store = MemoryStore::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let f = Memoizer::new(store.clone())
        .expires_in(1)
        .wrap("app::short_lived", counting(&calls, 7));

    assert_ok!(f.call(Args::new()).await);
    let key = f.get_cache_key(&Args::new());
    assert!(store.contains(&key).await);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(!store.contains(&key).await);
    assert_ok!(f.call(Args::new()).await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// == Refresh ==

#[tokio::test]
async fn test_refresh_overwrites_valid_entry() {
    let store = MemoryStore::new();
    let version = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&version);
    let f = Memoizer::new(store.clone()).wrap("app::config", move |_args: Args| {
        let v = seen.fetch_add(1, Ordering::SeqCst) as i64;
        async move { Ok::<_, Infallible>(v) }
    });

    assert_eq!(assert_ok!(f.call(Args::new()).await), Value::Int(0));
    assert_eq!(assert_ok!(f.refresh_cache(Args::new()).await), Value::Int(1));

    let key = f.get_cache_key(&Args::new());
    assert_eq!(assert_ok!(store.get(&key).await).as_deref(), Some("1"));
    assert_eq!(assert_ok!(f.call(Args::new()).await), Value::Int(1));
}

// == Structured Results ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Invoice {
    number: u32,
    customer: String,
    lines: Vec<String>,
    due: NaiveDate,
}

#[tokio::test]
async fn test_struct_result_comes_back_as_data() {
    let invoice = Invoice {
        number: 1042,
        customer: "Initech".to_string(),
        lines: vec!["TPS covers".to_string(), "Staplers".to_string()],
        due: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    };
    let expected = invoice.clone();
    let f = Memoizer::new(MemoryStore::new()).wrap("billing::invoice", move |_args: Args| {
        let invoice = invoice.clone();
        async move { Ok::<_, Infallible>(Json(invoice)) }
    });

    let miss = assert_ok!(f.call(args![1042]).await);
    let hit = assert_ok!(f.call(args![1042]).await);
    assert_eq!(miss, hit);
    assert_eq!(hit.get("due").and_then(Value::as_text), Some("2024-06-30"));

    let typed: Invoice = assert_ok!(hit.deserialize());
    assert_eq!(typed, expected);
}

#[tokio::test]
async fn test_map_result_roundtrips() {
    let f = Memoizer::new(MemoryStore::new()).wrap("inventory::counts", |_args: Args| async {
        let mut counts = HashMap::new();
        counts.insert("bolts".to_string(), 120);
        counts.insert("nuts".to_string(), 80);
        Ok::<_, Infallible>(counts)
    });

    assert_ok!(f.call(Args::new()).await);
    let hit = assert_ok!(f.call(Args::new()).await);
    assert_eq!(hit.get("bolts"), Some(&Value::Int(120)));
    assert_eq!(hit.get("nuts"), Some(&Value::Int(80)));
}

#[tokio::test]
async fn test_non_utf8_bytes_fail_to_encode() {
    let store = MemoryStore::new();
    let f = Memoizer::new(store.clone()).wrap("blob::read", |_args: Args| async {
        Ok::<_, Infallible>(Value::Bytes(vec![0xc3, 0x28]))
    });

    let err = assert_err!(f.call(Args::new()).await);
    assert!(matches!(err, MemoError::Serialization(_)));
    assert!(store.is_empty().await);
}

// == Bound Receivers ==

struct Account {
    id: &'static str,
}

#[tokio::test]
async fn test_bound_method_per_instance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let balance = Memoizer::new(MemoryStore::new()).wrap(
        callable_name!(Account::balance),
        move |args: Args| {
            seen.fetch_add(1, Ordering::SeqCst);
            let id = args
                .get(0)
                .and_then(Value::as_text)
                .unwrap_or_default()
                .to_string();
            let currency = args.get(1).cloned().unwrap_or(Value::Null);
            async move { Ok::<_, Infallible>(Value::from(vec![Value::from(id), currency])) }
        },
    );

    let obj1 = Account { id: "acct-1" };
    let obj2 = Account { id: "acct-2" };

    let r1 = assert_ok!(balance.bind(obj1.id).call(args!["usd"]).await);
    let r2 = assert_ok!(balance.bind(obj2.id).call(args!["usd"]).await);
    assert_ne!(r1, r2);
    assert_eq!(r1, Value::from(vec!["acct-1", "usd"]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Re-binding the same receiver hits the first receiver's entry.
    let again = assert_ok!(balance.bind(obj1.id).call(args!["usd"]).await);
    assert_eq!(again, r1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let key1 = balance.bind(obj1.id).get_cache_key(&args!["usd"]);
    let key2 = balance.bind(obj2.id).get_cache_key(&args!["usd"]);
    assert!(key1.contains("acct-1"));
    assert!(key2.contains("acct-2"));
}
