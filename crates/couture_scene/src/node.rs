use couture_core::{LightKey, MeshKey, NodeKey};
use smallvec::SmallVec;

use crate::transform::Transform;

/// Scene-graph node: hierarchy, transform and optional components.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: SmallVec<[NodeKey; 4]>,

    pub transform: Transform,
    pub visible: bool,

    pub mesh: Option<MeshKey>,
    pub light: Option<LightKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: SmallVec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            light: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
