//! Core object pool implementations

use crate::config::PoolConfiguration;
use crate::entry::PooledEntry;
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{MetricsExporter, MetricsTracker, PoolMetrics};
use crate::strategy::{IdentificationStrategy, Miss, Target};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;

type Factory<R> = Arc<dyn Fn() -> R + Send + Sync>;
type ReturnFn<R> = Arc<dyn Fn(&Arc<R>) + Send + Sync>;

/// A loan that returns itself to the pool when dropped
pub struct PooledObject<R> {
    resource: Option<Arc<R>>,
    return_fn: ReturnFn<R>,
}

impl<R> PooledObject<R> {
    fn new(resource: Arc<R>, return_fn: ReturnFn<R>) -> Self {
        Self {
            resource: Some(resource),
            return_fn,
        }
    }

    /// The borrowed resource.
    ///
    /// Passing it to `return_object` ends the loan early; the guard's own
    /// release is then ignored, even if the entry has been lent again.
    pub fn handle(&self) -> &Arc<R> {
        self.resource.as_ref().expect("Loan already taken")
    }

    /// Detach the loan; the caller becomes responsible for returning it
    pub fn into_inner(mut self) -> Arc<R> {
        self.resource.take().expect("Loan already taken")
    }
}

impl<R> Deref for PooledObject<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        self.handle()
    }
}

impl<R> Drop for PooledObject<R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            (self.return_fn)(&resource);
        }
    }
}

/// State shared by both pool flavours.
///
/// Every scan, flag flip and append happens under the one `entries` lock, so
/// check-then-act on a free entry and check-then-grow on capacity are atomic.
pub(crate) struct PoolInner<R, K> {
    entries: Mutex<Vec<PooledEntry<R>>>,
    strategy: IdentificationStrategy<K>,
    factory: Option<Factory<R>>,
    config: PoolConfiguration,
    metrics: MetricsTracker,
    key_label: fn(&K) -> String,
}

/// Where a loan was taken from, so its release can be checked
#[derive(Debug, Clone, Copy)]
struct LoanTicket {
    position: usize,
    generation: u64,
}

impl<R, K: Eq + Hash> PoolInner<R, K> {
    fn borrow(&self, target: Target<'_, K>) -> PoolResult<Arc<R>> {
        self.lend(target).map(|(resource, _)| resource)
    }

    fn lend(&self, target: Target<'_, K>) -> PoolResult<(Arc<R>, LoanTicket)> {
        let mut entries = self.entries.lock();

        let position = match self.strategy.locate(&entries, target) {
            Ok(position) => position,
            Err(Miss::NoneFree) => match self.grow(&mut entries) {
                Some(position) => position,
                None => {
                    MetricsTracker::record(&self.metrics.exhausted_events);
                    return Err(PoolError::Exhausted);
                }
            },
            Err(Miss::NotFound) => return Err(PoolError::NotFound(self.describe(target))),
            Err(Miss::AlreadyBusy) => return Err(PoolError::AlreadyBusy(self.describe(target))),
        };

        let entry = &mut entries[position];
        let generation = entry.lend();
        let resource = Arc::clone(entry.resource());
        drop(entries);

        MetricsTracker::record(&self.metrics.total_borrowed);
        tracing::info!(pool = %self.config.name, position, generation, "resource borrowed");
        Ok((resource, LoanTicket { position, generation }))
    }

    fn describe(&self, target: Target<'_, K>) -> String {
        match target {
            Target::AnyFree => "<any>".to_string(),
            Target::Key(key) => (self.key_label)(key),
        }
    }

    /// Append one free entry if a factory exists and there is room
    fn grow(&self, entries: &mut Vec<PooledEntry<R>>) -> Option<usize> {
        let factory = self.factory.as_ref()?;
        if entries.len() >= self.config.max_size {
            return None;
        }

        entries.push(PooledEntry::new(factory()));
        MetricsTracker::record(&self.metrics.total_created);
        tracing::debug!(pool = %self.config.name, size = entries.len(), "added pool entry");
        Some(entries.len() - 1)
    }

    fn add(&self) -> Option<Arc<R>> {
        let mut entries = self.entries.lock();
        let position = self.grow(&mut entries)?;
        Some(Arc::clone(entries[position].resource()))
    }

    fn release_resource(&self, handle: &Arc<R>) -> PoolResult<()> {
        let mut entries = self.entries.lock();
        let position = entries
            .iter()
            .position(|entry| entry.holds(handle))
            .ok_or(PoolError::UnknownResource);
        self.release_at(&mut entries, position)
    }

    fn release_key(&self, key: &K) -> PoolResult<()> {
        let mut entries = self.entries.lock();
        let position = self
            .strategy
            .position_of(key)
            .ok_or_else(|| PoolError::NotFound((self.key_label)(key)));
        self.release_at(&mut entries, position)
    }

    /// Release a guarded loan, but only if the entry is still on that loan
    fn release_ticket(&self, handle: &Arc<R>, ticket: LoanTicket) -> PoolResult<()> {
        let mut entries = self.entries.lock();
        let position = match entries.get(ticket.position) {
            Some(entry) if !entry.holds(handle) => Err(PoolError::UnknownResource),
            Some(entry) if entry.generation() != ticket.generation => Err(PoolError::NotBorrowed),
            Some(_) => Ok(ticket.position),
            None => Err(PoolError::UnknownResource),
        };
        self.release_at(&mut entries, position)
    }

    fn release_at(
        &self,
        entries: &mut [PooledEntry<R>],
        position: PoolResult<usize>,
    ) -> PoolResult<()> {
        let outcome = position.and_then(|position| match entries.get_mut(position) {
            Some(entry) if entry.is_busy() => {
                entry.set_busy(false);
                Ok(position)
            }
            Some(_) => Err(PoolError::NotBorrowed),
            None => Err(PoolError::UnknownResource),
        });

        match outcome {
            Ok(position) => {
                MetricsTracker::record(&self.metrics.total_returned);
                tracing::info!(pool = %self.config.name, position, "resource returned");
                Ok(())
            }
            Err(err) => {
                MetricsTracker::record(&self.metrics.ignored_returns);
                Err(err)
            }
        }
    }

    fn counts(&self) -> (usize, usize) {
        let entries = self.entries.lock();
        let busy = entries.iter().filter(|entry| entry.is_busy()).count();
        (busy, entries.len() - busy)
    }

    fn metrics(&self) -> PoolMetrics {
        let (busy, free) = self.counts();
        self.metrics.get_metrics(busy, free, self.config.max_size)
    }

    fn health_status(&self) -> HealthStatus {
        let (busy, free) = self.counts();
        HealthStatus::new(free, busy, self.config.max_size)
    }

    fn log_refusal(&self, err: &PoolError) {
        match err {
            PoolError::Exhausted => {
                tracing::warn!(pool = %self.config.name, max_size = self.config.max_size, "pool exhausted")
            }
            PoolError::NotFound(key) => {
                tracing::warn!(pool = %self.config.name, key = %key, "no entry for key")
            }
            PoolError::AlreadyBusy(key) => {
                tracing::warn!(pool = %self.config.name, key = %key, "entry already borrowed")
            }
            other => tracing::debug!(pool = %self.config.name, error = %other, "borrow refused"),
        }
    }

    /// Poll `attempt` until it succeeds, fails permanently, or the deadline passes
    async fn poll_until<F>(&self, attempt: F) -> PoolResult<Arc<R>>
    where
        F: Fn() -> PoolResult<Arc<R>>,
    {
        let timeout = self.config.operation_timeout;
        let interval = self.config.poll_interval;

        tokio::time::timeout(timeout, async {
            loop {
                match attempt() {
                    Err(err) if err.is_transient() => tokio::time::sleep(interval).await,
                    outcome => return outcome,
                }
            }
        })
        .await
        .map_err(|_| PoolError::Timeout(timeout))?
    }
}

impl<R, K> PoolInner<R, K>
where
    R: Send + Sync + 'static,
    K: Eq + Hash + Send + Sync + 'static,
{
    fn lend_guarded(self: &Arc<Self>, target: Target<'_, K>) -> PoolResult<PooledObject<R>> {
        let (resource, ticket) = self.lend(target).inspect_err(|err| self.log_refusal(err))?;
        let inner = Arc::clone(self);
        let return_fn: ReturnFn<R> = Arc::new(move |resource: &Arc<R>| {
            if let Err(err) = inner.release_ticket(resource, ticket) {
                tracing::debug!(pool = %inner.config.name, error = %err, "ignored stale guard release");
            }
        });
        Ok(PooledObject::new(resource, return_fn))
    }
}

/// Growing pool that lends the first free entry
///
/// # Examples
///
/// ```
/// use loanpool::{ObjectPool, PoolConfiguration, PoolError};
///
/// let config = PoolConfiguration::new().with_initial_size(1).with_max_size(2);
/// let pool = ObjectPool::new(|| String::from("conn"), config).unwrap();
///
/// let first = pool.borrow_object().unwrap();
/// let second = pool.borrow_object().unwrap(); // grows to max_size
/// assert_eq!(pool.borrow_object(), Err(PoolError::Exhausted));
///
/// pool.return_object(&first);
/// pool.return_object(&second);
/// assert_eq!(pool.available_count(), 2);
/// ```
pub struct ObjectPool<R> {
    inner: Arc<PoolInner<R, ()>>,
}

impl<R> Clone for ObjectPool<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Send + Sync + 'static> ObjectPool<R> {
    /// Create a pool, eagerly building `initial_size` resources with `factory`
    pub fn new<F>(factory: F, config: PoolConfiguration) -> PoolResult<Self>
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        config.validate()?;

        let metrics = MetricsTracker::new();
        let entries: Vec<_> = (0..config.initial_size)
            .map(|_| {
                MetricsTracker::record(&metrics.total_created);
                PooledEntry::new(factory())
            })
            .collect();

        tracing::debug!(
            pool = %config.name,
            initial_size = config.initial_size,
            max_size = config.max_size,
            "created object pool"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                entries: Mutex::new(entries),
                strategy: IdentificationStrategy::Scan,
                factory: Some(Arc::new(factory)),
                config,
                metrics,
                key_label: |_| String::new(),
            }),
        })
    }

    /// Borrow the first free resource, growing the pool if none is free
    pub fn borrow_object(&self) -> PoolResult<Arc<R>> {
        self.inner.borrow(Target::AnyFree).inspect_err(|err| self.inner.log_refusal(err))
    }

    /// Borrow without an error, `None` when exhausted
    pub fn try_borrow_object(&self) -> Option<Arc<R>> {
        self.borrow_object().ok()
    }

    /// Borrow a loan that returns itself when dropped
    pub fn borrow_guarded(&self) -> PoolResult<PooledObject<R>> {
        self.inner.lend_guarded(Target::AnyFree)
    }

    /// Keep trying to borrow until the configured timeout
    pub async fn borrow_object_async(&self) -> PoolResult<Arc<R>> {
        self.inner
            .poll_until(|| self.inner.borrow(Target::AnyFree))
            .await
            .inspect_err(|err| self.inner.log_refusal(err))
    }

    /// Return a borrowed resource.
    ///
    /// Handles the pool does not recognise, including ones orphaned by
    /// [`clear`](Self::clear), and repeated returns are ignored.
    pub fn return_object(&self, resource: &Arc<R>) {
        if let Err(err) = self.try_return_object(resource) {
            tracing::debug!(pool = %self.inner.config.name, error = %err, "ignored return");
        }
    }

    /// Return a borrowed resource, reporting unknown or already free handles
    pub fn try_return_object(&self, resource: &Arc<R>) -> PoolResult<()> {
        self.inner.release_resource(resource)
    }

    /// Add one free resource, `None` if the pool is at `max_size`
    pub fn add_object(&self) -> Option<Arc<R>> {
        self.inner.add()
    }

    /// Drop every entry; outstanding loans become orphaned
    pub fn clear(&self) {
        let mut entries = self.inner.entries.lock();
        let orphaned = entries.iter().filter(|entry| entry.is_busy()).count();
        entries.clear();
        tracing::debug!(pool = %self.inner.config.name, orphaned, "cleared pool");
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.inner.config.max_size
    }

    /// Get available count
    pub fn available_count(&self) -> usize {
        self.inner.counts().1
    }

    /// Get active count
    pub fn active_count(&self) -> usize {
        self.inner.counts().0
    }

    pub fn strategy(&self) -> &IdentificationStrategy<()> {
        &self.inner.strategy
    }

    /// Get health status
    pub fn health_status(&self) -> HealthStatus {
        self.inner.health_status()
    }

    /// Get pool metrics
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.metrics()
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.metrics().export()
    }

    /// Export metrics in Prometheus format, labelled with the pool name
    pub fn export_metrics_prometheus(&self, tags: Option<&HashMap<String, String>>) -> String {
        MetricsExporter::export_prometheus(&self.metrics(), &self.inner.config.name, tags)
    }
}

/// Fixed registry of resources addressed by key
///
/// # Examples
///
/// ```
/// use loanpool::{KeyedObjectPool, PoolConfiguration, PoolError};
///
/// let pool = KeyedObjectPool::new(
///     [("a".to_string(), 1), ("b".to_string(), 2)],
///     PoolConfiguration::new(),
/// )
/// .unwrap();
///
/// let a = pool.borrow_object(&"a".to_string()).unwrap();
/// assert_eq!(*a, 1);
/// assert!(matches!(pool.borrow_object(&"a".to_string()), Err(PoolError::AlreadyBusy(_))));
/// pool.return_object(&"a".to_string());
/// assert!(pool.borrow_object(&"a".to_string()).is_ok());
/// ```
pub struct KeyedObjectPool<K, R> {
    inner: Arc<PoolInner<R, K>>,
}

impl<K, R> Clone for KeyedObjectPool<K, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, R> KeyedObjectPool<K, R>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Build the registry. Sizes in `config` are replaced by the key count.
    pub fn new<I>(resources: I, mut config: PoolConfiguration) -> PoolResult<Self>
    where
        I: IntoIterator<Item = (K, R)>,
    {
        let metrics = MetricsTracker::new();
        let mut index = HashMap::new();
        let mut entries = Vec::new();

        for (key, resource) in resources {
            if index.contains_key(&key) {
                return Err(PoolError::Configuration(format!("duplicate key {key}")));
            }
            index.insert(key, entries.len());
            entries.push(PooledEntry::new(resource));
            MetricsTracker::record(&metrics.total_created);
        }

        config.initial_size = entries.len();
        config.max_size = entries.len();
        tracing::debug!(pool = %config.name, keys = entries.len(), "created keyed pool");

        Ok(Self {
            inner: Arc::new(PoolInner {
                entries: Mutex::new(entries),
                strategy: IdentificationStrategy::Keyed(index),
                factory: None,
                config,
                metrics,
                key_label: K::to_string,
            }),
        })
    }

    /// Borrow the resource registered under `key`
    pub fn borrow_object(&self, key: &K) -> PoolResult<Arc<R>> {
        self.inner.borrow(Target::Key(key)).inspect_err(|err| self.inner.log_refusal(err))
    }

    pub fn try_borrow_object(&self, key: &K) -> Option<Arc<R>> {
        self.borrow_object(key).ok()
    }

    /// Borrow whichever entry is free first, in registration order
    pub fn borrow_any(&self) -> PoolResult<Arc<R>> {
        self.inner.borrow(Target::AnyFree).inspect_err(|err| self.inner.log_refusal(err))
    }

    /// Borrow `key` as a loan that returns itself when dropped
    pub fn borrow_guarded(&self, key: &K) -> PoolResult<PooledObject<R>> {
        self.inner.lend_guarded(Target::Key(key))
    }

    /// Keep trying to borrow `key` until the configured timeout.
    ///
    /// Unknown keys fail immediately.
    pub async fn borrow_object_async(&self, key: &K) -> PoolResult<Arc<R>> {
        self.inner
            .poll_until(|| self.inner.borrow(Target::Key(key)))
            .await
            .inspect_err(|err| self.inner.log_refusal(err))
    }

    /// Mark `key` free again; unknown keys only produce a warning
    pub fn return_object(&self, key: &K) {
        match self.try_return_object(key) {
            Ok(()) => {}
            Err(PoolError::NotFound(_)) => {
                tracing::warn!(pool = %self.inner.config.name, key = %key, "returned unknown key")
            }
            Err(err) => {
                tracing::debug!(pool = %self.inner.config.name, key = %key, error = %err, "ignored return")
            }
        }
    }

    pub fn try_return_object(&self, key: &K) -> PoolResult<()> {
        self.inner.release_key(key)
    }

    /// `Some(busy)` for a registered key, `None` otherwise
    pub fn is_busy(&self, key: &K) -> Option<bool> {
        let position = self.inner.strategy.position_of(key)?;
        self.inner.entries.lock().get(position).map(PooledEntry::is_busy)
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> Vec<K> {
        match &self.inner.strategy {
            IdentificationStrategy::Keyed(index) => {
                let mut keys: Vec<_> = index.iter().collect();
                keys.sort_by_key(|(_, position)| **position);
                keys.into_iter().map(|(key, _)| key.clone()).collect()
            }
            IdentificationStrategy::Scan => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn available_count(&self) -> usize {
        self.inner.counts().1
    }

    pub fn active_count(&self) -> usize {
        self.inner.counts().0
    }

    pub fn strategy(&self) -> &IdentificationStrategy<K> {
        &self.inner.strategy
    }

    pub fn health_status(&self) -> HealthStatus {
        self.inner.health_status()
    }

    pub fn metrics(&self) -> PoolMetrics {
        self.inner.metrics()
    }

    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.metrics().export()
    }

    pub fn export_metrics_prometheus(&self, tags: Option<&HashMap<String, String>>) -> String {
        MetricsExporter::export_prometheus(&self.metrics(), &self.inner.config.name, tags)
    }
}
