// Copyright (c) 2022-2023 The MobileCoin Foundation

use lockbox_core::engine::LockStore;

/// In-memory retained lock state, standing in for RTC memory
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MemStore {
    engaged: bool,
    writes: usize,
}

impl MemStore {
    /// Create a store holding the provided lock state
    pub fn new(engaged: bool) -> Self {
        Self { engaged, writes: 0 }
    }

    /// Current stored lock state
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Number of writes since creation
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LockStore for MemStore {
    fn load(&self) -> bool {
        self.engaged
    }

    fn store(&mut self, engaged: bool) {
        self.engaged = engaged;
        self.writes += 1;
    }
}
