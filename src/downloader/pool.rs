//! Reusable byte-buffer pool
//!
//! Response bodies are streamed into buffers drawn from this pool so that
//! steady-state crawling does not allocate a fresh buffer per fetch. Buffers
//! keep their grown capacity across uses; an exhausted pool falls back to
//! allocating.

use std::sync::Mutex;

/// A fixed seed of reusable byte buffers
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

impl BufferPool {
    /// Creates a pool pre-seeded with `count` buffers of `capacity` bytes
    pub fn new(count: usize, capacity: usize) -> Self {
        let buffers = (0..count).map(|_| Vec::with_capacity(capacity)).collect();
        Self {
            buffers: Mutex::new(buffers),
            capacity,
        }
    }

    /// Takes a buffer from the pool, allocating one if the pool is empty
    pub fn get(&self) -> Vec<u8> {
        let mut buffers = self.buffers.lock().unwrap();
        buffers
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.capacity))
    }

    /// Returns a buffer to the pool for reuse
    ///
    /// The caller must have copied out any bytes it still needs; the buffer
    /// is cleared here and its contents become invalid.
    pub fn put(&self, mut buffer: Vec<u8>) {
        buffer.clear();
        let mut buffers = self.buffers.lock().unwrap();
        buffers.push(buffer);
    }

    /// Number of buffers currently idle in the pool
    pub fn available(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(10, 1024)
    }
}
