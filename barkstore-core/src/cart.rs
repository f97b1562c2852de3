//! Shopping cart store.
//!
//! One line per product id, quantity always at least 1; `decrease` removes
//! the line when the quantity would drop to zero. Every mutation is written
//! through to a JSON file so a restart reconstructs the same cart.
//! Persistence is best-effort: a failed write is logged and never blocks
//! the in-memory mutation.

use barkstore_sdk::objects::{CartLine, CartView};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::catalog::Catalog;

/// Version tag of the persisted cart envelope.
const STORAGE_VERSION: u32 = 1;

/// Persisted representation: a versioned, ordered sequence of lines.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCart {
    version: u32,
    lines: Vec<CartLine>,
}

#[derive(Debug, Error)]
enum HydrateError {
    #[error("failed to read cart file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse cart file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown cart storage version {0}")]
    Version(u32),
}

/// In-memory cart with write-through persistence.
///
/// Lines keep insertion order, matching the order the shopper added
/// products in.
#[derive(Debug)]
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Option<PathBuf>,
}

impl CartStore {
    /// An unpersisted, empty cart.
    pub fn in_memory() -> Self {
        Self {
            lines: Vec::new(),
            storage: None,
        }
    }

    /// Open a cart backed by `path`, hydrating any previously persisted
    /// lines. A missing, malformed or wrong-version file yields an empty
    /// cart rather than a startup failure.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lines = match Self::hydrate(&path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "cart hydration failed, starting with an empty cart"
                );
                Vec::new()
            }
        };
        Self {
            lines,
            storage: Some(path),
        }
    }

    fn hydrate(path: &Path) -> Result<Vec<CartLine>, HydrateError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let stored: StoredCart = serde_json::from_str(&raw)?;
        if stored.version != STORAGE_VERSION {
            return Err(HydrateError::Version(stored.version));
        }
        // Drop any zero-quantity line a foreign writer may have left behind.
        Ok(stored.lines.into_iter().filter(|l| l.quantity > 0).collect())
    }

    /// Quantity of one product, 0 if absent.
    pub fn quantity(&self, id: u32) -> u32 {
        self.lines
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Add one of a product, inserting a new line at quantity 1 if needed.
    pub fn increase(&mut self, id: u32) {
        match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine { id, quantity: 1 }),
        }
        self.persist();
    }

    /// Remove one of a product. A line at quantity 1 is removed entirely;
    /// an absent id is a no-op.
    pub fn decrease(&mut self, id: u32) {
        let Some(pos) = self.lines.iter().position(|l| l.id == id) else {
            return;
        };
        match self.lines.get_mut(pos) {
            Some(line) if line.quantity > 1 => line.quantity -= 1,
            _ => {
                self.lines.retain(|l| l.id != id);
            }
        }
        self.persist();
    }

    /// Delete a line unconditionally.
    pub fn remove(&mut self, id: u32) {
        self.lines.retain(|l| l.id != id);
        self.persist();
    }

    /// Empty all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Derived: sum of all line quantities.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Current lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cart contents with totals priced against `catalog`. Lines without
    /// a catalog match contribute nothing to the subtotal.
    pub fn view(&self, catalog: &Catalog) -> CartView {
        let subtotal_usd = self
            .lines
            .iter()
            .filter_map(|l| catalog.get(l.id).map(|p| p.price * Decimal::from(l.quantity)))
            .sum();
        CartView {
            lines: self.lines.clone(),
            total_quantity: self.total_quantity(),
            subtotal_usd,
        }
    }

    /// Best-effort write-through. Failures are logged, never returned.
    fn persist(&self) {
        let Some(path) = &self.storage else {
            return;
        };
        let stored = StoredCart {
            version: STORAGE_VERSION,
            lines: self.lines.clone(),
        };
        if let Err(e) = write_atomic(path, &stored) {
            warn!(path = %path.display(), error = %e, "failed to persist cart");
        }
    }
}

/// Write to a temp file, then rename over the target.
fn write_atomic(path: &Path, stored: &StoredCart) -> std::io::Result<()> {
    let json = serde_json::to_string(stored).map_err(std::io::Error::other)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_increase_inserts_then_increments() {
        let mut cart = CartStore::in_memory();
        cart.increase(1);
        cart.increase(1);
        cart.increase(2);
        assert_eq!(cart.quantity(1), 2);
        assert_eq!(cart.quantity(2), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_decrease_removes_line_at_one() {
        let mut cart = CartStore::in_memory();
        cart.increase(1);
        cart.decrease(1);
        assert_eq!(cart.quantity(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrease_absent_is_noop() {
        let mut cart = CartStore::in_memory();
        cart.increase(1);
        cart.decrease(42);
        assert_eq!(cart.quantity(1), 1);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_no_nonpositive_quantities_after_any_sequence() {
        let mut cart = CartStore::in_memory();
        let ops: &[(u8, u32)] = &[
            (0, 1),
            (0, 1),
            (1, 1),
            (1, 1),
            (1, 1),
            (0, 2),
            (2, 2),
            (1, 2),
            (0, 3),
            (1, 3),
            (2, 3),
            (0, 2),
        ];
        for &(op, id) in ops {
            match op {
                0 => cart.increase(id),
                1 => cart.decrease(id),
                _ => cart.remove(id),
            }
            assert!(cart.lines().iter().all(|l| l.quantity >= 1));
            let expected: u32 = cart.lines().iter().map(|l| l.quantity).sum();
            assert_eq!(cart.total_quantity(), expected);
        }
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = CartStore::in_memory();
        cart.increase(1);
        cart.increase(2);
        cart.remove(1);
        assert_eq!(cart.quantity(1), 0);
        assert_eq!(cart.total_quantity(), 1);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_view_prices_against_catalog() {
        let catalog = Catalog::builtin();
        let mut cart = CartStore::in_memory();
        cart.increase(1); // $1.00
        cart.increase(1);
        cart.increase(2); // $10.00
        cart.increase(999); // not in the catalog

        let view = cart.view(&catalog);
        assert_eq!(view.total_quantity, 4);
        assert_eq!(view.subtotal_usd, dec!(12.00));
    }

    #[test]
    fn test_persistence_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopping-cart.json");

        {
            let mut cart = CartStore::open(&path);
            cart.increase(1);
            cart.increase(1);
            cart.increase(3);
        }

        let reloaded = CartStore::open(&path);
        assert_eq!(reloaded.quantity(1), 2);
        assert_eq!(reloaded.quantity(3), 1);
        assert_eq!(reloaded.total_quantity(), 3);
    }

    #[test]
    fn test_malformed_storage_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopping-cart.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cart = CartStore::open(&path);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_version_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopping-cart.json");
        std::fs::write(&path, r#"{"version": 99, "lines": [{"id": 1, "quantity": 2}]}"#).unwrap();

        let cart = CartStore::open(&path);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_mutation_survives_unwritable_storage() {
        // Storage under a directory that does not exist: every write
        // fails, mutations must still apply in memory.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("shopping-cart.json");
        let mut cart = CartStore::open(path);
        cart.increase(1);
        assert_eq!(cart.quantity(1), 1);
    }
}
