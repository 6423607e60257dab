//! # Interning
//!
//! Categories live for the lifetime of a grammar and are referred to by
//! dense [`CatId`] handles everywhere else (rule tables, chart items,
//! count tables).
//!
//! The table is content-addressed: a category's key is a 64-bit
//! fingerprint taken from the SHA-256 digest of its canonical string form.
//! If a fingerprint is already bound to a *structurally different*
//! category, interning fails with [`CategoryError::InternCollision`].
//! The existing entry is never overwritten.
//!
//! Both tables are safe to share between parser workers. Reads take a
//! shared lock; a miss upgrades to an exclusive lock and re-checks, so two
//! workers interning the same category observe the same handle.

use crate::category::Category;
use crate::error::CategoryError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// Handle to an interned category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatId(pub u32);

impl CatId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 64-bit content fingerprint of a category.
pub fn fingerprint(category: &Category) -> u64 {
    let digest = Sha256::digest(category.to_string().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[derive(Default)]
struct InternTable {
    by_fingerprint: HashMap<u64, CatId>,
    categories: Vec<Category>,
}

impl InternTable {
    fn lookup(&self, fp: u64, category: &Category) -> Result<Option<CatId>, CategoryError> {
        match self.by_fingerprint.get(&fp) {
            Some(&id) => {
                let existing = &self.categories[id.index()];
                if existing == category {
                    Ok(Some(id))
                } else {
                    Err(CategoryError::InternCollision {
                        fingerprint: fp,
                        existing: existing.to_string(),
                        incoming: category.to_string(),
                    })
                }
            }
            None => Ok(None),
        }
    }
}

/// Content-addressed category table.
#[derive(Default)]
pub struct CategoryInterner {
    table: RwLock<InternTable>,
}

impl CategoryInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a category, returning its stable handle.
    pub fn intern(&self, category: &Category) -> Result<CatId, CategoryError> {
        self.intern_with_fingerprint(category, fingerprint(category))
    }

    /// Parse and intern a category string.
    pub fn intern_str(&self, text: &str) -> Result<CatId, CategoryError> {
        let category: Category = text.parse()?;
        self.intern(&category)
    }

    pub(crate) fn intern_with_fingerprint(
        &self,
        category: &Category,
        fp: u64,
    ) -> Result<CatId, CategoryError> {
        if let Some(id) = self.table.read().lookup(fp, category)? {
            return Ok(id);
        }

        let mut table = self.table.write();
        // Another writer may have landed between the two locks.
        if let Some(id) = table.lookup(fp, category)? {
            return Ok(id);
        }
        let id = CatId(table.categories.len() as u32);
        table.categories.push(category.clone());
        table.by_fingerprint.insert(fp, id);
        Ok(id)
    }

    /// Handle of an already-interned category.
    pub fn get(&self, category: &Category) -> Option<CatId> {
        let table = self.table.read();
        let id = *table.by_fingerprint.get(&fingerprint(category))?;
        (table.categories[id.index()] == *category).then_some(id)
    }

    /// The category behind a handle.
    pub fn resolve(&self, id: CatId) -> Result<Category, CategoryError> {
        self.table
            .read()
            .categories
            .get(id.index())
            .cloned()
            .ok_or(CategoryError::UnknownHandle { id: id.0 })
    }

    pub fn len(&self) -> usize {
        self.table.read().categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all interned categories in handle order.
    pub fn categories(&self) -> Vec<Category> {
        self.table.read().categories.clone()
    }
}

impl fmt::Debug for CategoryInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Handle to an interned word or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Default)]
struct VocabTable {
    ids: HashMap<String, SymbolId>,
    names: Vec<String>,
}

/// Interning table for words and part-of-speech tags.
#[derive(Default)]
pub struct Vocab {
    table: RwLock<VocabTable>,
}

impl Vocab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string.
    pub fn intern(&self, name: &str) -> SymbolId {
        if let Some(&id) = self.table.read().ids.get(name) {
            return id;
        }
        let mut table = self.table.write();
        if let Some(&id) = table.ids.get(name) {
            return id;
        }
        let id = SymbolId(table.names.len() as u32);
        table.names.push(name.to_string());
        table.ids.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.table.read().ids.get(name).copied()
    }

    pub fn name(&self, id: SymbolId) -> Option<String> {
        self.table.read().names.get(id.index()).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Vocab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocab").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_intern_is_stable() {
        let interner = CategoryInterner::new();
        let a = interner.intern_str("(S\\NP)/NP").unwrap();
        let b = interner.intern_str("(S\\NP)/NP").unwrap();
        let c = interner.intern_str("S\\NP").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.resolve(a).unwrap().to_string(), "(S\\NP)/NP");
    }

    #[test]
    fn test_collision_is_fatal() {
        let interner = CategoryInterner::new();
        let np = Category::np();
        let s = Category::s();
        interner.intern_with_fingerprint(&np, 42).unwrap();

        let err = interner.intern_with_fingerprint(&s, 42).unwrap_err();
        assert!(matches!(err, CategoryError::InternCollision { fingerprint: 42, .. }));
        // The original binding survives.
        assert_eq!(interner.intern_with_fingerprint(&np, 42).unwrap(), CatId(0));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_unknown_handle() {
        let interner = CategoryInterner::new();
        assert_eq!(
            interner.resolve(CatId(7)),
            Err(CategoryError::UnknownHandle { id: 7 })
        );
    }

    #[test]
    fn test_concurrent_interning_agrees() {
        let interner = Arc::new(CategoryInterner::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let interner = Arc::clone(&interner);
                thread::spawn(move || {
                    ["NP", "S\\NP", "(S\\NP)/NP", "N/N"]
                        .iter()
                        .map(|text| interner.intern_str(text).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(interner.len(), 4);
    }

    #[test]
    fn test_vocab() {
        let vocab = Vocab::new();
        let dt = vocab.intern("DT");
        assert_eq!(vocab.intern("DT"), dt);
        assert_eq!(vocab.name(dt).as_deref(), Some("DT"));
        assert_eq!(vocab.get("NN"), None);
    }
}
