//! Pooled storage for captured path parameters.
//!
//! Every matched request needs somewhere to put its captures. Rather than allocating
//! fresh strings per request, buffers are drawn from a [`ParamsPool`] and handed out
//! wrapped in a [`Params`] guard. Dropping the guard clears the buffer in place and puts
//! it back, so the release happens on every exit path, unwinding included.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, RouterError};

/// The raw storage behind [`Params`].
///
/// Slots past the live counts are kept after [`ParamsBuffer::clear`], and later captures
/// are copied into their existing strings.
#[derive(Debug, Clone, Default)]
pub struct ParamsBuffer {
    named: Vec<(Arc<str>, String)>,
    named_len: usize,
    wildcards: Vec<String>,
    wildcards_len: usize,
}

impl ParamsBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a named capture. A later call with the same name overwrites the value.
    pub fn set(&mut self, name: &Arc<str>, value: &str) {
        let live = &mut self.named[..self.named_len];
        if let Some((_, slot)) = live.iter_mut().find(|(k, _)| **k == **name) {
            refill(slot, value);
            return;
        }
        match self.named.get_mut(self.named_len) {
            Some((key, slot)) => {
                *key = Arc::clone(name);
                refill(slot, value);
            }
            None => self.named.push((Arc::clone(name), value.to_owned())),
        }
        self.named_len += 1;
    }

    /// Appends a wildcard value.
    pub fn push_wildcard(&mut self, value: &str) {
        match self.wildcards.get_mut(self.wildcards_len) {
            Some(slot) => refill(slot, value),
            None => self.wildcards.push(value.to_owned()),
        }
        self.wildcards_len += 1;
    }

    /// Forgets every capture, keeping the slots and their strings.
    pub fn clear(&mut self) {
        self.named_len = 0;
        self.wildcards_len = 0;
    }

    /// Returns true if nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.named_len == 0 && self.wildcards_len == 0
    }

    fn named(&self) -> &[(Arc<str>, String)] {
        &self.named[..self.named_len]
    }

    fn wildcards(&self) -> &[String] {
        &self.wildcards[..self.wildcards_len]
    }
}

fn refill(slot: &mut String, value: &str) {
    slot.clear();
    slot.push_str(value);
}

/// A concurrent free list of [`ParamsBuffer`]s.
#[derive(Debug)]
pub struct ParamsPool {
    free: Mutex<Vec<ParamsBuffer>>,
    max_idle: usize,
    allocated: AtomicUsize,
}

impl ParamsPool {
    /// Creates a pool that keeps at most `max_idle` buffers around between requests.
    pub fn new(max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_idle,
            allocated: AtomicUsize::new(0),
        }
    }

    /// Allocates up to `count` buffers now, bounded by the idle cap.
    pub fn prewarm(&self, count: usize) {
        let mut free = self.free.lock();
        let wanted = count.min(self.max_idle).saturating_sub(free.len());
        free.extend((0..wanted).map(|_| ParamsBuffer::new()));
        self.allocated.fetch_add(wanted, Ordering::Relaxed);
    }

    /// Takes a buffer from the pool, allocating one if none is idle.
    ///
    /// The buffer returns to this pool when the guard is dropped.
    pub fn acquire(self: &Arc<Self>) -> Params {
        let pooled = self.free.lock().pop();
        let buf = pooled.unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            ParamsBuffer::new()
        });
        debug_assert!(buf.is_empty());
        Params {
            buf,
            pool: Some(Arc::clone(self)),
        }
    }

    /// Clears `buf` and keeps it for reuse, unless the pool is already full.
    pub fn release(&self, mut buf: ParamsBuffer) {
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(buf);
        }
    }

    /// Number of buffers currently idle.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    /// Number of buffers this pool has ever allocated.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

/// Captures extracted for one request.
///
/// Named captures come from `{name}`, `{name:pattern}` and `:name` segments; wildcard
/// values come from `*` segments, in the order they appear in the template.
///
/// ```
/// use std::sync::Arc;
/// use oxide_regex_router::PathPattern;
/// use oxide_regex_router::params::ParamsPool;
///
/// let pool = Arc::new(ParamsPool::new(4));
/// let pattern = PathPattern::new("/blog/:year/*").unwrap();
/// let params = pattern.match_path("/blog/2018/hello/world", &pool).unwrap().unwrap();
/// assert_eq!(params.get("year"), Some("2018"));
/// assert_eq!(params.wildcards(), ["hello/world"]);
/// ```
#[derive(Default)]
pub struct Params {
    buf: ParamsBuffer,
    pool: Option<Arc<ParamsPool>>,
}

impl Params {
    /// Creates empty params that are not tied to any pool.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut ParamsBuffer {
        &mut self.buf
    }

    /// Gets a named capture.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.buf
            .named()
            .iter()
            .find(|(k, _)| &**k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a named capture or returns an error.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| RouterError::MissingParam(name.to_string()))
    }

    /// Parses a named capture as a specific type.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Wildcard values, left to right.
    pub fn wildcards(&self) -> &[String] {
        self.buf.wildcards()
    }

    /// Gets the wildcard value at `index`.
    pub fn wildcard(&self, index: usize) -> Option<&str> {
        self.buf.wildcards().get(index).map(String::as_str)
    }

    /// Iterates over named captures in the order they were first set.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.buf.named().iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Number of named captures.
    pub fn len(&self) -> usize {
        self.buf.named().len()
    }

    /// Returns true if there are neither named captures nor wildcards.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Drop for Params {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(std::mem::take(&mut self.buf));
        }
    }
}

// A clone is a detached copy; only the original goes back to the pool.
impl Clone for Params {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            pool: None,
        }
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("named", &self.buf.named())
            .field("wildcards", &self.buf.wildcards())
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}
