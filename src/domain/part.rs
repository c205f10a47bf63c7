/// Collaborator boundary: what the trooper model needs from the scene graph
/// and from the audio system.
///
/// The model never renders or mixes anything itself. It creates and destroys
/// nodes, places them, and triggers positioned sounds. Anything that can do
/// that (the in-memory `SceneGraph`, a real engine, a test double) plugs in
/// through these two traits.

use glam::Vec3;

/// Opaque handle to a renderable node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct PartId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Named shape, shader and material of a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Facade {
    pub shape: &'static str,
    pub shader: &'static str,
    pub material: &'static str,
}

impl Facade {
    pub const fn cube(material: &'static str) -> Self {
        Facade { shape: "cube", shader: "flata", material }
    }
}

/// Individual cells and merged cubes.
pub const CELL: Facade = Facade::cube("tgreen");
/// Panel slabs and the merged trooper body.
pub const SLAB: Facade = Facade::cube("tblue");
/// Interior decoration.
pub const CORE: Facade = Facade::cube("tred");

/// Renderable node capability.
///
/// Removing a node removes its whole subtree. Unknown ids are ignored so
/// teardown paths can be called more than once.
pub trait Scene {
    fn add_part(&mut self, parent: PartId) -> PartId;
    fn rem_part(&mut self, part: PartId);

    fn set_location(&mut self, part: PartId, at: Vec3);
    fn location(&self, part: PartId) -> Vec3;
    fn set_scale(&mut self, part: PartId, scale: Vec3);
    fn scale(&self, part: PartId) -> Vec3;
    /// Incremental rotation about a local axis.
    fn rotate(&mut self, part: PartId, axis: Axis, degrees: f32);

    fn set_facade(&mut self, part: PartId, facade: Facade);
    fn set_alpha(&mut self, part: PartId, alpha: f32);
    fn alpha(&self, part: PartId) -> f32;
    fn set_visible(&mut self, part: PartId, visible: bool);
}

/// Create a visible block under `parent`.
pub fn spawn(scene: &mut dyn Scene, parent: PartId, facade: Facade, at: Vec3, scale: Vec3) -> PartId {
    let part = scene.add_part(parent);
    scene.set_facade(part, facade);
    scene.set_location(part, at);
    scene.set_scale(part, scale);
    part
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sound {
    Cloak,
    Decloak,
    Teleport,
}

/// Positioned, fire-and-forget sound playback.
pub trait Audio {
    /// Move the listener (the "ears") to a point.
    fn set_listener(&mut self, at: Vec3);
    fn play_at(&mut self, sound: Sound, at: Vec3);
}

/// Audio sink that drops everything. Used when no output device exists.
pub struct Silence;

impl Audio for Silence {
    fn set_listener(&mut self, _at: Vec3) {}
    fn play_at(&mut self, _sound: Sound, _at: Vec3) {}
}
