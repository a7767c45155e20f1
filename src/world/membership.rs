//! Scene membership bookkeeping.
//!
//! Three maps record which scene holds each actor, light and camera. They
//! are query state only: the scene object itself is the native
//! [`NativeScene`](crate::native::NativeScene), and a component with
//! membership `INVALID_VID` still exists, it is just not placed anywhere.

use rustc_hash::FxHashMap;

use crate::core::{ComponentKind, INVALID_VID, Vid};
use crate::world::World;

impl World {
    fn membership_map(&self, vid: Vid) -> Option<&FxHashMap<Vid, Vid>> {
        match self.kind(vid)? {
            ComponentKind::Camera => Some(&self.camera_scene),
            ComponentKind::Light => Some(&self.light_scene),
            k if k.is_actor() => Some(&self.actor_scene),
            _ => None,
        }
    }

    /// The slot holding `vid`'s scene, if `vid` has a membership entry.
    pub(crate) fn membership_slot_mut(&mut self, vid: Vid) -> Option<&mut Vid> {
        if let Some(slot) = self.actor_scene.get_mut(&vid) {
            return Some(slot);
        }
        if let Some(slot) = self.light_scene.get_mut(&vid) {
            return Some(slot);
        }
        self.camera_scene.get_mut(&vid)
    }

    /// Membership entry of a scene component: `Some(INVALID_VID)` when it is
    /// not placed, `None` when `vid` is not a scene component.
    #[must_use]
    pub fn membership(&self, vid: Vid) -> Option<Vid> {
        self.membership_map(vid)?.get(&vid).copied()
    }

    /// The scene `vid` resolves to: a scene VID resolves to itself, a scene
    /// component to its membership entry. `INVALID_VID` otherwise.
    #[must_use]
    pub fn scene_of(&self, vid: Vid) -> Vid {
        if self.scenes.contains_key(&vid) {
            return vid;
        }
        self.actor_scene
            .get(&vid)
            .or_else(|| self.light_scene.get(&vid))
            .or_else(|| self.camera_scene.get(&vid))
            .copied()
            .unwrap_or(INVALID_VID)
    }

    /// Entities currently held by the scene object of `scene`.
    #[must_use]
    pub fn scene_entities(&self, scene: Vid) -> Vec<Vid> {
        self.native_scene(scene)
            .map(|s| s.entities().to_vec())
            .unwrap_or_default()
    }

    /// Scene components whose membership entry names `scene`.
    #[must_use]
    pub fn scene_members(&self, scene: Vid) -> Vec<Vid> {
        let mut out: Vec<Vid> = self
            .actor_scene
            .iter()
            .chain(self.light_scene.iter())
            .chain(self.camera_scene.iter())
            .filter(|&(_, &s)| s == scene && scene.is_valid())
            .map(|(&vid, _)| vid)
            .collect();
        out.sort_unstable();
        out
    }

    /// Sets the entry to `scene` if `vid` has one. Missing entries are a
    /// no-op (bones and other plain nodes have none).
    pub(crate) fn set_membership(&mut self, vid: Vid, scene: Vid) {
        if let Some(slot) = self.membership_slot_mut(vid) {
            *slot = scene;
            self.touch(vid);
        }
    }

    pub(crate) fn reset_membership(&mut self, vid: Vid) {
        self.set_membership(vid, INVALID_VID);
    }

    /// Drops `vid` from every membership map.
    pub(crate) fn erase_membership(&mut self, vid: Vid) {
        self.actor_scene.remove(&vid);
        self.light_scene.remove(&vid);
        self.camera_scene.remove(&vid);
    }
}
