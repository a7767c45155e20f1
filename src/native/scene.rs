use slotmap::new_key_type;

use crate::core::Vid;

new_key_type! {
    /// Handle of a native scene object.
    pub struct NativeSceneKey;
}

/// Native scene object: the flat list of entities that get rendered.
///
/// It knows nothing about hierarchy; adding a parent does not add its
/// children.
#[derive(Debug, Default, Clone)]
pub struct NativeScene {
    entities: Vec<Vid>,
}

impl NativeScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `vid` once; repeated adds are ignored.
    pub fn add_entity(&mut self, vid: Vid) {
        if !self.has_entity(vid) {
            self.entities.push(vid);
        }
    }

    /// Returns whether `vid` was present.
    pub fn remove(&mut self, vid: Vid) -> bool {
        if let Some(i) = self.entities.iter().position(|&e| e == vid) {
            self.entities.remove(i);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn has_entity(&self, vid: Vid) -> bool {
        self.entities.contains(&vid)
    }

    #[must_use]
    pub fn entities(&self) -> &[Vid] {
        &self.entities
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut scene = NativeScene::new();
        let v = Vid::from_parts(5, 0);
        scene.add_entity(v);
        scene.add_entity(v);
        assert_eq!(scene.entity_count(), 1);
        assert!(scene.remove(v));
        assert!(!scene.remove(v));
        assert!(!scene.has_entity(v));
    }
}
