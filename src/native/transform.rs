//! Transform hierarchy.
//!
//! Every scene component (and every skeleton bone) owns one transform node.
//! Nodes form a forest: `parent == None` marks a root. The manager keeps
//! parent and child lists in sync and refuses edits that would create a
//! cycle.

use glam::{Affine3A, Quat, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::Vid;

/// Local placement of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One node of the forest: links, local placement and the world matrix
/// computed by the last [`TransformManager::update_world_matrices`].
#[derive(Debug, Clone)]
pub struct TransformNode {
    pub(crate) parent: Option<Vid>,
    pub(crate) children: SmallVec<[Vid; 4]>,
    pub transform: Transform,
    world_matrix: Affine3A,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            transform: Transform::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
        }
    }
}

impl TransformNode {
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Vid> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Vid] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }
}

#[derive(Debug, Default)]
pub struct TransformManager {
    nodes: FxHashMap<Vid, TransformNode>,
    roots: Vec<Vid>,
}

impl TransformManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `vid` a transform node as a new root. No-op if it already has one.
    pub fn create(&mut self, vid: Vid) {
        if self.nodes.contains_key(&vid) {
            return;
        }
        self.nodes.insert(vid, TransformNode::default());
        self.roots.push(vid);
    }

    #[inline]
    #[must_use]
    pub fn has(&self, vid: Vid) -> bool {
        self.nodes.contains_key(&vid)
    }

    #[must_use]
    pub fn get(&self, vid: Vid) -> Option<&TransformNode> {
        self.nodes.get(&vid)
    }

    pub fn get_mut(&mut self, vid: Vid) -> Option<&mut TransformNode> {
        self.nodes.get_mut(&vid)
    }

    #[must_use]
    pub fn parent(&self, vid: Vid) -> Option<Vid> {
        self.nodes.get(&vid).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, vid: Vid) -> &[Vid] {
        self.nodes.get(&vid).map_or(&[][..], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn roots(&self) -> &[Vid] {
        &self.roots
    }

    /// `true` if `ancestor` is `vid` itself or one of its parents.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: Vid, vid: Vid) -> bool {
        let mut current = Some(vid);
        while let Some(v) = current {
            if v == ancestor {
                return true;
            }
            current = self.parent(v);
        }
        false
    }

    /// Re-links `child` under `parent` (or makes it a root for `None`).
    ///
    /// Returns `false` without touching anything if either node is missing
    /// or the edit would create a cycle.
    pub fn set_parent(&mut self, child: Vid, parent: Option<Vid>) -> bool {
        if !self.nodes.contains_key(&child) {
            return false;
        }
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                log::warn!("set_parent: parent {p} has no transform node");
                return false;
            }
            if self.is_ancestor_or_self(child, p) {
                log::warn!("set_parent: {child} -> {p} would create a cycle");
                return false;
            }
        }

        self.unlink(child);

        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.push(child);
                }
            }
            None => self.roots.push(child),
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }
        true
    }

    /// `vid` followed by all of its descendants, in pre-order.
    #[must_use]
    pub fn collect_subtree(&self, vid: Vid) -> Vec<Vid> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(&vid) {
            return out;
        }
        let mut stack = vec![vid];
        while let Some(v) = stack.pop() {
            out.push(v);
            for &child in self.children(v).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Removes the node of `vid`. Its children become roots.
    pub fn destroy(&mut self, vid: Vid) {
        if !self.nodes.contains_key(&vid) {
            return;
        }
        self.unlink(vid);
        if let Some(node) = self.nodes.remove(&vid) {
            for child in node.children {
                if let Some(c) = self.nodes.get_mut(&child) {
                    c.parent = None;
                    self.roots.push(child);
                }
            }
        }
    }

    /// Recomputes every world matrix from the roots down.
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(Vid, Affine3A)> = self
            .roots
            .iter()
            .rev()
            .map(|&root| (root, Affine3A::IDENTITY))
            .collect();

        while let Some((vid, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&vid) else {
                continue;
            };
            node.world_matrix = parent_world * node.transform.to_affine();
            let world = node.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn unlink(&mut self, vid: Vid) {
        match self.parent(vid) {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p)
                    && let Some(i) = node.children.iter().position(|&c| c == vid)
                {
                    node.children.remove(i);
                }
            }
            None => {
                if let Some(i) = self.roots.iter().position(|&r| r == vid) {
                    self.roots.remove(i);
                }
            }
        }
    }
}
