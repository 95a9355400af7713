/// Identifier following `current_max`.
pub fn next_id(current_max: u64) -> u64 {
    current_max + 1
}

/// Monotonic counter for one collection. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u64 {
        self.last = next_id(self.last);
        self.last
    }

    /// Highest id handed out so far, 0 if none.
    pub fn current(&self) -> u64 {
        self.last
    }
}
