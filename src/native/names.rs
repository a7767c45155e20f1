//! Name component manager.
//!
//! Names are interned: many entities loaded from one asset share names such
//! as "Armature" or "Bone.001", so each entity stores a compact [`Spur`]
//! instead of its own `String`.

use lasso::{Rodeo, Spur};
use rustc_hash::FxHashMap;

use crate::core::Vid;

#[derive(Debug, Default)]
pub struct NameComponentManager {
    interner: Rodeo,
    names: FxHashMap<Vid, Spur>,
}

impl NameComponentManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a name to `vid`. Returns `false` if it already had one.
    pub fn create_name_comp(&mut self, vid: Vid, name: &str) -> bool {
        if self.names.contains_key(&vid) {
            return false;
        }
        let sym = self.interner.get_or_intern(name);
        self.names.insert(vid, sym);
        true
    }

    /// Renames `vid`, creating the component if needed.
    pub fn set_name(&mut self, vid: Vid, name: &str) {
        let sym = self.interner.get_or_intern(name);
        self.names.insert(vid, sym);
    }

    #[must_use]
    pub fn has(&self, vid: Vid) -> bool {
        self.names.contains_key(&vid)
    }

    #[must_use]
    pub fn get_name(&self, vid: Vid) -> Option<&str> {
        self.names.get(&vid).map(|sym| self.interner.resolve(sym))
    }

    /// All entities carrying `name`, in ascending VID order.
    #[must_use]
    pub fn get_entities_by_name(&self, name: &str) -> Vec<Vid> {
        let Some(sym) = self.interner.get(name) else {
            return Vec::new();
        };
        let mut out: Vec<Vid> = self
            .names
            .iter()
            .filter(|&(_, s)| *s == sym)
            .map(|(&vid, _)| vid)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn remove_entity(&mut self, vid: Vid) -> bool {
        self.names.remove(&vid).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
