/// SceneGraph: in-memory node tree behind the `Scene` trait.
///
/// Nodes live in an id-keyed arena. Each node has a local transform
/// (location, rotation, scale), an optional facade and an alpha. Only nodes
/// with a facade are drawn; everything else is a grouping transform.
///
/// ## Transforms
///
///   world(node) = world(parent) * T(location) * R(rotation) * S(scale)
///
/// The "cube" shape spans -1..1 on every axis, so a node's scale is the
/// half-extent of its block. Alpha multiplies down the tree and a hidden
/// node hides its whole subtree.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use tracing::warn;

use crate::domain::part::{Axis, Facade, PartId, Scene};

#[derive(Clone, Debug)]
struct Node {
    parent: Option<PartId>,
    children: Vec<PartId>,
    location: Vec3,
    rotation: Quat,
    scale: Vec3,
    facade: Option<Facade>,
    alpha: f32,
    visible: bool,
}

impl Node {
    fn new(parent: Option<PartId>) -> Self {
        Node {
            parent,
            children: Vec::new(),
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            facade: None,
            alpha: 1.0,
            visible: true,
        }
    }

    fn local(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }
}

/// A drawable node resolved to world space.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub part: PartId,
    pub facade: Facade,
    pub world: Mat4,
    pub alpha: f32,
}

impl Block {
    /// The 8 corners of the block in world space.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut out = [Vec3::ZERO; 8];
        for (i, c) in out.iter_mut().enumerate() {
            let x = if i & 4 == 0 { -1.0 } else { 1.0 };
            let y = if i & 2 == 0 { -1.0 } else { 1.0 };
            let z = if i & 1 == 0 { -1.0 } else { 1.0 };
            *c = self.world.transform_point3(Vec3::new(x, y, z));
        }
        out
    }

    pub fn center(&self) -> Vec3 {
        self.world.transform_point3(Vec3::ZERO)
    }
}

pub struct SceneGraph {
    nodes: HashMap<PartId, Node>,
    next: u32,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    const ROOT: PartId = PartId(0);

    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(Self::ROOT, Node::new(None));
        SceneGraph { nodes, next: 1 }
    }

    pub fn root(&self) -> PartId {
        Self::ROOT
    }

    /// Number of nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, part: PartId) -> bool {
        self.nodes.contains_key(&part)
    }

    pub fn children(&self, part: PartId) -> &[PartId] {
        self.nodes.get(&part).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, part: PartId) -> Option<PartId> {
        self.nodes.get(&part).and_then(|n| n.parent)
    }

    pub fn facade(&self, part: PartId) -> Option<Facade> {
        self.nodes.get(&part).and_then(|n| n.facade)
    }

    /// Local-to-world matrix of a node.
    pub fn world(&self, part: PartId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cur = Some(part);
        while let Some(id) = cur {
            let Some(node) = self.nodes.get(&id) else { break };
            m = node.local() * m;
            cur = node.parent;
        }
        m
    }

    /// Every visible drawable node, parents before children.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        let mut out = Vec::new();
        let mut stack = vec![(Self::ROOT, Mat4::IDENTITY, 1.0f32)];
        while let Some((id, parent, alpha)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else { continue };
            if !node.visible {
                continue;
            }
            let world = parent * node.local();
            let alpha = alpha * node.alpha;
            if let Some(facade) = node.facade {
                out.push(Block { part: id, facade, world, alpha });
            }
            for child in node.children.iter().rev() {
                stack.push((*child, world, alpha));
            }
        }
        out.into_iter()
    }

    fn node_mut(&mut self, part: PartId) -> Option<&mut Node> {
        let node = self.nodes.get_mut(&part);
        if node.is_none() {
            warn!(part = part.0, "unknown scene part");
        }
        node
    }
}

impl Scene for SceneGraph {
    fn add_part(&mut self, parent: PartId) -> PartId {
        let parent = if self.nodes.contains_key(&parent) {
            parent
        } else {
            warn!(parent = parent.0, "unknown parent, attaching to root");
            Self::ROOT
        };
        let id = PartId(self.next);
        self.next += 1;
        self.nodes.insert(id, Node::new(Some(parent)));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    fn rem_part(&mut self, part: PartId) {
        if part == Self::ROOT {
            return;
        }
        let Some(node) = self.nodes.remove(&part) else { return };
        if let Some(p) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != part);
        }
        let mut stack = node.children;
        while let Some(id) = stack.pop() {
            if let Some(child) = self.nodes.remove(&id) {
                stack.extend(child.children);
            }
        }
    }

    fn set_location(&mut self, part: PartId, at: Vec3) {
        if let Some(n) = self.node_mut(part) {
            n.location = at;
        }
    }

    fn location(&self, part: PartId) -> Vec3 {
        self.nodes.get(&part).map_or(Vec3::ZERO, |n| n.location)
    }

    fn set_scale(&mut self, part: PartId, scale: Vec3) {
        if let Some(n) = self.node_mut(part) {
            n.scale = scale;
        }
    }

    fn scale(&self, part: PartId) -> Vec3 {
        self.nodes.get(&part).map_or(Vec3::ONE, |n| n.scale)
    }

    fn rotate(&mut self, part: PartId, axis: Axis, degrees: f32) {
        if let Some(n) = self.node_mut(part) {
            n.rotation = (n.rotation * Quat::from_axis_angle(axis.unit(), degrees.to_radians())).normalize();
        }
    }

    fn set_facade(&mut self, part: PartId, facade: Facade) {
        if let Some(n) = self.node_mut(part) {
            n.facade = Some(facade);
        }
    }

    fn set_alpha(&mut self, part: PartId, alpha: f32) {
        if let Some(n) = self.node_mut(part) {
            n.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn alpha(&self, part: PartId) -> f32 {
        self.nodes.get(&part).map_or(1.0, |n| n.alpha)
    }

    fn set_visible(&mut self, part: PartId, visible: bool) {
        if let Some(n) = self.node_mut(part) {
            n.visible = visible;
        }
    }
}
