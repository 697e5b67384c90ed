use std::sync::{Mutex, MutexGuard, PoisonError};

/// Capture limit per connection: 1 MiB.
pub const MAX_CAPTURE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Default)]
struct Inner {
    buf: Vec<u8>,
    remaining: usize,
    truncated: bool,
}

/// Bounded sink recording one direction of a relayed connection.
///
/// The relay task writes while the finalizer may already be reading, so every
/// operation goes through one lock. Writes never fail: bytes past the limit
/// are dropped and the truncated flag is set for good. The buffer is always a
/// prefix of everything written.
#[derive(Debug)]
pub struct CaptureRecorder {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl CaptureRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                buf: Vec::new(),
                remaining: capacity,
                truncated: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a poisoned buffer still holds a valid prefix
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `data`, returning `data.len()` whatever was kept.
    pub fn write(&self, data: &[u8]) -> usize {
        let mut inner = self.lock();
        if data.len() > inner.remaining {
            let keep = inner.remaining;
            inner.buf.extend_from_slice(&data[..keep]);
            inner.remaining = 0;
            inner.truncated = true;
        } else {
            inner.buf.extend_from_slice(data);
            inner.remaining -= data.len();
        }
        data.len()
    }

    /// Copy of the bytes buffered so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().buf.clone()
    }

    pub fn truncated(&self) -> bool {
        self.lock().truncated
    }

    pub fn len(&self) -> usize {
        self.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CaptureRecorder {
    fn default() -> Self {
        Self::new(MAX_CAPTURE_BYTES)
    }
}
