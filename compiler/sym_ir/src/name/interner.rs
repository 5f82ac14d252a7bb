//! String interner backing `Name`.
//!
//! Single table behind a `RwLock`: the analysis is single-threaded, but the
//! interner is shared read-mostly between the arena and tooling.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        InternTable {
            map,
            strings: vec![empty],
        }
    }
}

/// Interner handing out `Name`s in allocation order.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

/// Interner shared between an arena and its consumers.
pub type SharedInterner = Arc<StringInterner>;

impl StringInterner {
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(InternTable::with_empty()),
        }
    }

    /// Intern a string.
    ///
    /// # Panics
    /// Panics past `u32::MAX` distinct strings.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&index) = self.table.read().map.get(s) {
            return Name::from_raw(index);
        }

        let mut table = self.table.write();
        if let Some(&index) = table.map.get(s) {
            return Name::from_raw(index);
        }

        let Ok(index) = u32::try_from(table.strings.len()) else {
            panic!("string interner exceeded {} entries", u32::MAX);
        };
        // Interned strings live for the whole process.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Name::from_raw(index)
    }

    /// Look up an interned string.
    ///
    /// # Panics
    /// Panics if `name` was produced by a different interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        let table = self.table.read();
        match table.strings.get(name.index()) {
            Some(s) => s,
            None => panic!("{name:?} was not produced by this interner"),
        }
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        // The empty string is always present.
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
