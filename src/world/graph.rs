//! Scene graph mutation.
//!
//! [`World::append_scene_entity_to_parent`] moves an entity (with its whole
//! transform subtree) or the full contents of a scene under a new parent,
//! which is either another entity or a scene. The transform hierarchy and
//! the membership indices are updated together.

use crate::core::Vid;
use crate::errors::{RegistryError, Result};
use crate::world::World;

/// How the two sides of an append resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppendCase {
    /// Entity under entity in a different (or no) scene.
    EntityToEntity,
    /// All of a scene's contents under an entity.
    SceneToEntity,
    /// Entity into a scene, or re-rooted inside the scene it already
    /// belongs to.
    EntityToScene,
    /// One scene merged into another.
    SceneToScene,
}

impl World {
    /// Makes `src` a child of `dst`.
    ///
    /// Either side may be a scene or a transform node:
    /// - entity → entity: `dst` becomes the transform parent of `src`
    /// - scene → entity: every root of the scene is parented under `dst`
    /// - entity → scene: the subtree of `src` is placed in the scene, its
    ///   local hierarchy untouched
    /// - scene → scene: the contents of `src` move to `dst` and `src` is
    ///   destroyed
    ///
    /// When `src` and `dst` are both entities of the same live scene, no
    /// transform parent is set; the subtree is only re-placed in that scene.
    ///
    /// In every case the moved entities leave their old scene and, if `dst`
    /// resolves to a scene, join it with their membership updated.
    pub fn append_scene_entity_to_parent(&mut self, src: Vid, dst: Vid) -> Result<()> {
        if src == dst {
            return Err(RegistryError::SelfAppend(src));
        }

        let src_is_scene = self.scenes.contains_key(&src);
        let dst_is_scene = self.scenes.contains_key(&dst);
        if !src_is_scene && !self.engine.transforms.has(src) {
            return Err(RegistryError::NotFound(src));
        }
        if !dst_is_scene && !self.engine.transforms.has(dst) {
            return Err(RegistryError::NotFound(dst));
        }

        let src_scene = self.scene_of(src);
        let dst_scene = self.scene_of(dst);

        let case = match (src_is_scene, dst_is_scene) {
            (false, false) if src_scene.is_valid() && src_scene == dst_scene => {
                AppendCase::EntityToScene
            }
            (false, false) => AppendCase::EntityToEntity,
            (true, false) => AppendCase::SceneToEntity,
            (false, true) => AppendCase::EntityToScene,
            (true, true) => AppendCase::SceneToScene,
        };
        log::debug!("append {src:?} -> {dst:?} as {case:?}");

        let moving = match case {
            AppendCase::EntityToEntity => {
                if self.engine.transforms.is_ancestor_or_self(src, dst) {
                    return Err(RegistryError::HierarchyCycle {
                        child: src,
                        parent: dst,
                    });
                }
                self.engine.transforms.set_parent(src, Some(dst));
                self.engine.transforms.collect_subtree(src)
            }
            AppendCase::SceneToEntity => {
                let entities = self.scene_entities(src);
                let roots: Vec<Vid> = entities
                    .iter()
                    .copied()
                    .filter(|&e| e != dst && self.engine.transforms.parent(e).is_none())
                    .filter(|&e| self.engine.transforms.has(e))
                    .collect();
                if let Some(&root) = roots
                    .iter()
                    .find(|&&r| self.engine.transforms.is_ancestor_or_self(r, dst))
                {
                    return Err(RegistryError::HierarchyCycle {
                        child: root,
                        parent: dst,
                    });
                }
                for root in roots {
                    self.engine.transforms.set_parent(root, Some(dst));
                }
                entities
            }
            AppendCase::EntityToScene => self.engine.transforms.collect_subtree(src),
            AppendCase::SceneToScene => {
                let entities = self.scene_entities(src);
                self.remove_scene(src)?;
                entities
            }
        };

        let target_scene = if dst_is_scene { dst } else { dst_scene };
        let target_native = self.scenes.get(&target_scene).map(|r| r.native);

        for vid in moving {
            self.engine.remove_from_all_scenes(vid);
            self.reset_membership(vid);
            if let Some(native) = target_native {
                if let Some(scene) = self.engine.scene_mut(native) {
                    scene.add_entity(vid);
                }
                self.set_membership(vid, target_scene);
            }
        }

        self.touch(src);
        self.touch(dst);
        Ok(())
    }
}
