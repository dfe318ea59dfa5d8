//! Per-resolver memoization cache.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

/// Lazily filled cache of accessor results, keyed by accessor name.
///
/// The cache is never held borrowed while a value is computed, so an
/// accessor may read other memoized accessors of the same resolver.
#[derive(Default)]
pub struct Memo {
  values: RefCell<HashMap<&'static str, Box<dyn Any>>>,
}

impl Memo {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the cached value for `key`, computing and storing it first if
  /// absent.
  pub fn get_or_insert_with<T, F>(&self, key: &'static str, compute: F) -> T
  where
    T: Clone + 'static,
    F: FnOnce() -> T,
  {
    if let Some(value) = self.values.borrow().get(key).and_then(|v| v.downcast_ref::<T>()) {
      return value.clone();
    }

    trace!(key, "memo miss");
    let value = compute();
    self.values.borrow_mut().insert(key, Box::new(value.clone()));
    value
  }

  /// Drops every cached value.
  pub fn clear(&self) {
    self.values.borrow_mut().clear();
  }

  pub fn len(&self) -> usize {
    self.values.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.borrow().is_empty()
  }
}

impl fmt::Debug for Memo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let values = self.values.borrow();
    let mut keys: Vec<_> = values.keys().collect();
    keys.sort_unstable();
    f.debug_struct("Memo").field("keys", &keys).finish()
  }
}
