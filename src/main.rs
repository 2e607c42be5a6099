//! Redis Memo demo
//!
//! Memoizes a slow exchange-rate lookup against the configured store and
//! shows cold calls, warm calls, bound receivers and forced refreshes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_memo::{
    args, callable_name, spawn_cleanup_task, Args, Config, HttpStore, Json, KeyValueStore,
    Memoizer, MemoryStore, StoreBackend, Value,
};

#[derive(Debug, Error)]
enum RateError {
    #[error("missing currency argument at position {0}")]
    MissingCurrency(usize),
    #[error("no rate for {0}/{1}")]
    UnknownPair(String, String),
}

#[derive(Debug, Serialize)]
struct Quote {
    base: String,
    quote: String,
    rate: f64,
    as_of: DateTime<Utc>,
}

fn currency(args: &Args, index: usize) -> Result<String, RateError> {
    args.get(index)
        .and_then(Value::as_text)
        .map(str::to_ascii_uppercase)
        .ok_or(RateError::MissingCurrency(index))
}

/// Stands in for a slow upstream API.
async fn exchange_rate(args: Args) -> Result<Json<Quote>, RateError> {
    let base = currency(&args, 0)?;
    let quote = currency(&args, 1)?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let rate = match (base.as_str(), quote.as_str()) {
        ("EUR", "USD") => 1.08,
        ("USD", "EUR") => 0.93,
        ("GBP", "USD") => 1.27,
        (b, q) if b == q => 1.0,
        _ => return Err(RateError::UnknownPair(base, quote)),
    };

    Ok(Json(Quote {
        base,
        quote,
        rate,
        as_of: Utc::now(),
    }))
}

/// Values the bound owner's holding. The owner arrives as the first argument.
async fn holding_value(args: Args) -> Result<f64, RateError> {
    let owner = args.get(0).and_then(Value::as_text).unwrap_or_default();
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(owner.len() as f64 * 1000.0)
}

async fn build_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn KeyValueStore>, Option<JoinHandle<()>>)> {
    match config.backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            let cleanup = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            Ok((Arc::new(store), Some(cleanup)))
        }
        StoreBackend::Http => {
            let store = HttpStore::new(&config.store_url)
                .with_context(|| format!("building http store for {}", config.store_url))?;
            Ok((Arc::new(store), None))
        }
        #[cfg(feature = "redis-store")]
        StoreBackend::Redis => {
            let store = redis_memo::store::RedisStore::connect(&config.store_url).await?;
            Ok((Arc::new(store), None))
        }
        #[cfg(not(feature = "redis-store"))]
        StoreBackend::Redis => anyhow::bail!("redis backend requires the `redis-store` feature"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_memo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={}, ttl={}s, store_url={}",
        config.backend, config.default_ttl, config.store_url
    );

    let (store, cleanup) = build_store(&config).await?;
    let memoizer = Memoizer::from_config(store, &config).single_flight(true);

    let rates = memoizer.wrap(callable_name!(exchange_rate), exchange_rate);
    let pair = args!["eur", "usd"];
    info!("Cache key: {}", rates.get_cache_key(&pair));

    for attempt in ["cold", "warm"] {
        let started = Instant::now();
        let quote = rates.call(pair.clone()).await?;
        info!(
            "{} call: rate={} in {:?}",
            attempt,
            quote.get("rate").map(ToString::to_string).unwrap_or_default(),
            started.elapsed()
        );
    }

    let refreshed = rates.refresh_cache(pair.clone()).await?;
    info!(
        "Refreshed quote as of {}",
        refreshed.get("as_of").map(ToString::to_string).unwrap_or_default()
    );

    match rates.call(args!["eur", "jpy"]).await {
        Ok(quote) => info!("Unexpected quote: {}", quote),
        Err(err) => info!("Uncached failure: {}", err),
    }

    let holdings = memoizer.wrap(callable_name!(holding_value), holding_value);
    for owner in ["ada", "grace", "ada"] {
        let value = holdings.bind(owner).call(Args::new()).await?;
        info!("{} holds {}", owner, value);
    }

    info!("Rate stats: {:?}", rates.stats());
    info!("Holding stats: {:?}", holdings.stats());

    if let Some(handle) = cleanup {
        handle.abort();
    }
    Ok(())
}
