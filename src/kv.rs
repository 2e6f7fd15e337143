use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StoreResult;

pub const APPLICATIONS_KEY: &str = "jobApplications";
pub const COMPANIES_KEY: &str = "companies";
/// Column order of the board, kept when `board_order = "manual"`.
pub const BOARD_ORDER_KEY: &str = "boardOrder";

/// String-keyed storage holding one JSON document per key.
pub trait KvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-process storage. Clones share the same map, so a caller can keep a
/// handle and inspect what a subscriber wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls seen so far.
    #[cfg(test)]
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
