use parking_lot::RwLock;

use crate::filter::{Filter, FilterBuilder};

/// A filter that keeps accepting ranges while being queried.
///
/// Inserts take the write lock, lookups the read lock. Prefer building a
/// [`Filter`] up front when the range set is known before first use.
#[derive(Debug, Default)]
pub struct SharedFilter {
    inner: RwLock<FilterBuilder>,
}

impl SharedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the ranges of an existing builder.
    pub fn from_builder(builder: FilterBuilder) -> Self {
        Self {
            inner: RwLock::new(builder),
        }
    }

    /// Register a CIDR literal, `true` if it was accepted.
    pub fn insert(&self, cidr: &str) -> bool {
        self.inner.write().insert(cidr)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.inner.read().contains(address)
    }

    /// Copy the current ranges into an immutable filter.
    pub fn snapshot(&self) -> Filter {
        self.inner.read().clone().build()
    }
}
