//! Cache Orchestrator
//!
//! Wraps an async callable so that calls are answered from the store when an
//! unexpired result exists, and otherwise computed and written back with a TTL.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::codec::{self, Encodable, Value};
use crate::config::Config;
use crate::error::MemoError;
use crate::memo::stats::StatsRecorder;
use crate::memo::{derive_key, Args, CacheStats};
use crate::store::KeyValueStore;

/// TTL applied when none is configured.
pub const DEFAULT_TTL_SECONDS: u64 = 300;

// == Memoizer ==
/// Factory that wraps callables against one shared store.
///
/// ```ignore
/// let memoizer = Memoizer::new(MemoryStore::new()).expires_in(60);
/// let quote = memoizer.wrap(callable_name!(quote), |args: Args| async move {
///     fetch_quote(args.get(0)).await
/// });
/// let price = quote.call(args!["ACME"]).await?;
/// ```
#[derive(Clone)]
pub struct Memoizer {
    store: Arc<dyn KeyValueStore>,
    ttl: u64,
    single_flight: bool,
}

impl Memoizer {
    // == Constructor ==
    /// Creates a memoizer over `store` with the default TTL.
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        Self::shared(Arc::new(store))
    }

    /// Creates a memoizer over an already shared store.
    pub fn shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl: DEFAULT_TTL_SECONDS,
            single_flight: false,
        }
    }

    /// Creates a memoizer using the configured TTL.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self::shared(store).expires_in(config.default_ttl)
    }

    /// Sets the TTL, in seconds, written with every entry.
    pub fn expires_in(mut self, seconds: u64) -> Self {
        self.ttl = seconds;
        self
    }

    /// Collapses concurrent misses on the same key into a single call.
    ///
    /// Off by default: concurrent misses each run the callable and the last
    /// write wins.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Wrap ==
    /// Wraps `func`, identified by its fully qualified name.
    pub fn wrap<F>(&self, identity: impl Into<String>, func: F) -> Memoized<F> {
        Memoized {
            inner: Arc::new(Inner {
                identity: identity.into(),
                ttl: self.ttl,
                store: Arc::clone(&self.store),
                func,
                stats: StatsRecorder::default(),
                in_flight: self.single_flight.then(InFlight::default),
            }),
        }
    }
}

struct Inner<F> {
    identity: String,
    ttl: u64,
    store: Arc<dyn KeyValueStore>,
    func: F,
    stats: StatsRecorder,
    in_flight: Option<InFlight>,
}

// == Memoized ==
/// A memoized callable. Clones share the callable, store and statistics.
///
/// Hits and misses both return the decoded [`Value`], so a result looks the
/// same whether it was just computed or read back from the store.
pub struct Memoized<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for Memoized<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> Memoized<F> {
    /// Fully qualified name of the wrapped callable.
    pub fn identity(&self) -> &str {
        &self.inner.identity
    }

    pub fn ttl(&self) -> u64 {
        self.inner.ttl
    }

    // == Get Cache Key ==
    /// Returns the key a call with `args` reads and writes. Touches nothing.
    pub fn get_cache_key(&self, args: &Args) -> String {
        derive_key(&self.inner.identity, args)
    }

    // == Bind ==
    /// Binds a receiver, method style.
    ///
    /// Returns a new handle; the receiver is prepended to the positional
    /// arguments of every call made through it, so different receivers never
    /// share entries.
    pub fn bind(&self, receiver: impl Into<Value>) -> BoundMemoized<F> {
        BoundMemoized {
            receiver: receiver.into(),
            memo: self.clone(),
        }
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot()
    }
}

impl<F, Fut, R, E> Memoized<F>
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Encodable,
{
    // == Call ==
    /// Returns the stored result for `args`, computing and storing it on a miss.
    ///
    /// Store failures, encoding failures and callable failures are all
    /// returned as-is. Failed calls are never stored.
    pub async fn call(&self, args: Args) -> Result<Value, MemoError<E>> {
        let key = self.get_cache_key(&args);

        if let Some(value) = self.lookup(&key).await? {
            return Ok(value);
        }

        let Some(in_flight) = &self.inner.in_flight else {
            return self.populate(&key, args).await;
        };

        let flight = in_flight.enter(&key);
        let _held = flight.wait().await;
        // Another caller may have filled the entry while we waited.
        match self.lookup(&key).await? {
            Some(value) => Ok(value),
            None => self.populate(&key, args).await,
        }
    }

    // == Refresh Cache ==
    /// Runs the callable unconditionally and overwrites the stored entry.
    pub async fn refresh_cache(&self, args: Args) -> Result<Value, MemoError<E>> {
        let key = self.get_cache_key(&args);
        debug!("refreshing {}", key);
        self.inner.stats.record_refresh();
        self.compute_and_store(&key, args).await
    }

    async fn lookup(&self, key: &str) -> Result<Option<Value>, MemoError<E>> {
        match self.inner.store.get(key).await? {
            Some(text) => {
                debug!("cache hit: {}", key);
                self.inner.stats.record_hit();
                Ok(Some(codec::decode(&text)?))
            }
            None => Ok(None),
        }
    }

    async fn populate(&self, key: &str, args: Args) -> Result<Value, MemoError<E>> {
        debug!("cache miss: {}", key);
        self.inner.stats.record_miss();
        self.compute_and_store(key, args).await
    }

    async fn compute_and_store(&self, key: &str, args: Args) -> Result<Value, MemoError<E>> {
        let text = {
            let result = (self.inner.func)(args).await.map_err(MemoError::Callable)?;
            codec::encode_result(&result)?
        };
        self.inner.store.set_ex(key, &text, self.inner.ttl).await?;
        debug!("stored {} ({} bytes, ttl {}s)", key, text.len(), self.inner.ttl);
        Ok(codec::decode(&text)?)
    }
}

// == Bound Memoized ==
/// A memoized callable bound to a receiver.
///
/// Cheap to create per access: holds the receiver value and a shared handle
/// to the wrapped callable.
pub struct BoundMemoized<F> {
    receiver: Value,
    memo: Memoized<F>,
}

impl<F> BoundMemoized<F> {
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    /// Key for a call with `args` on this receiver.
    pub fn get_cache_key(&self, args: &Args) -> String {
        self.memo
            .get_cache_key(&args.clone().with_receiver(self.receiver.clone()))
    }
}

impl<F, Fut, R, E> BoundMemoized<F>
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Encodable,
{
    /// Same as [`Memoized::call`], with the receiver as first positional argument.
    pub async fn call(&self, args: Args) -> Result<Value, MemoError<E>> {
        self.memo
            .call(args.with_receiver(self.receiver.clone()))
            .await
    }

    /// Same as [`Memoized::refresh_cache`], with the receiver as first positional argument.
    pub async fn refresh_cache(&self, args: Args) -> Result<Value, MemoError<E>> {
        self.memo
            .refresh_cache(args.with_receiver(self.receiver.clone()))
            .await
    }
}

// == In Flight ==
/// Per-key locks for single-flight misses.
#[derive(Default)]
struct InFlight {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InFlight {
    fn enter<'a>(&'a self, key: &'a str) -> Flight<'a> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(locks.entry(key.to_string()).or_default());
        Flight {
            in_flight: self,
            key,
            lock: Some(lock),
        }
    }
}

/// One caller's registration on a key. Dropping it, including when the call
/// is cancelled, removes the key's lock once nobody else holds or waits on it.
struct Flight<'a> {
    in_flight: &'a InFlight,
    key: &'a str,
    lock: Option<Arc<Mutex<()>>>,
}

impl Flight<'_> {
    async fn wait(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .in_flight
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Released under the map lock so a concurrent `enter` sees a stable count.
        drop(self.lock.take());
        if locks.get(self.key).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(self.key);
        }
    }
}
