//! Strongly-typed handles shared by every crate in the workspace.
//!
//! Scene-owned objects (nodes, meshes, materials, lights) are stored in
//! `SlotMap`s keyed by these handles. Two meshes "share a material" exactly
//! when their [`MaterialKey`]s compare equal.

use slotmap::new_key_type;

new_key_type! {
    /// Node in the scene hierarchy.
    pub struct NodeKey;
    /// Renderable mesh component attached to a node.
    pub struct MeshKey;
    /// Material instance owned by a scene.
    pub struct MaterialKey;
    /// Light component attached to a node.
    pub struct LightKey;
    /// Texture stored in the asset server.
    pub struct TextureHandle;
}
