//! Arena-backed quadtree over a power-of-two grid
//!
//! Nodes live in a flat `Vec` and refer to their children by [`NodeId`]. The
//! tree only ever grows between resets, so ids stay valid until the next
//! [`QuadTree::reset`], which clears the arena in place.

use std::fmt;
use std::ops::Range;

use crate::io::configuration::validate_side_length;
use crate::io::error::{Result, invalid_operation};

/// Index of a node inside a [`QuadTree`] arena
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node, always the first arena entry
    pub const ROOT: Self = Self(0);

    /// Position in the arena
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Square grid region addressed by its top-left corner
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// Column of the top-left pixel
    pub x: u32,
    /// Row of the top-left pixel
    pub y: u32,
    /// Side length in pixels
    pub extent: u32,
}

impl Region {
    /// Create a region from its corner and side length
    pub const fn new(x: u32, y: u32, extent: u32) -> Self {
        Self { x, y, extent }
    }

    /// Number of pixels covered
    pub const fn area(&self) -> u64 {
        self.extent as u64 * self.extent as u64
    }

    /// Test if a pixel lies inside the region
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.extent && y >= self.y && y < self.y + self.extent
    }

    /// Test if the region is a single pixel
    pub const fn is_unit(&self) -> bool {
        self.extent == 1
    }

    /// Row indices covered by the region
    pub const fn rows(&self) -> Range<usize> {
        self.y as usize..(self.y + self.extent) as usize
    }

    /// Column indices covered by the region
    pub const fn cols(&self) -> Range<usize> {
        self.x as usize..(self.x + self.extent) as usize
    }

    /// The four half-extent quadrants in NW, NE, SW, SE order
    pub const fn quadrants(&self) -> [Self; 4] {
        let half = self.extent / 2;
        [
            Self::new(self.x, self.y, half),
            Self::new(self.x + half, self.y, half),
            Self::new(self.x, self.y + half, half),
            Self::new(self.x + half, self.y + half, half),
        ]
    }
}

/// Lifecycle state of a node
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Unsplit region still waiting to be refined
    Leaf,
    /// Region split into four children
    Interior {
        /// Children in NW, NE, SW, SE order
        children: [NodeId; 4],
    },
    /// Unit region that has been refined and takes no further part
    Retired,
}

/// A square region of the grid at a given subdivision depth
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Node {
    depth: u32,
    region: Region,
    kind: NodeKind,
}

impl Node {
    const fn leaf(depth: u32, region: Region) -> Self {
        Self {
            depth,
            region,
            kind: NodeKind::Leaf,
        }
    }

    /// Subdivision depth, 0 at the root
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Covered grid region
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Current lifecycle state
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Test if the node has no children (live or retired)
    pub const fn is_leaf(&self) -> bool {
        !self.is_interior()
    }

    /// Test if the node has been split
    pub const fn is_interior(&self) -> bool {
        matches!(self.kind, NodeKind::Interior { .. })
    }

    /// Test if the node has been retired from refinement
    pub const fn is_retired(&self) -> bool {
        matches!(self.kind, NodeKind::Retired)
    }

    /// Test if the node is at the finest resolution and cannot be split
    pub const fn is_terminal(&self) -> bool {
        self.region.is_unit()
    }

    /// Children in NW, NE, SW, SE order, if split
    pub const fn children(&self) -> Option<[NodeId; 4]> {
        match self.kind {
            NodeKind::Interior { children } => Some(children),
            NodeKind::Leaf | NodeKind::Retired => None,
        }
    }
}

/// Quadtree whose nodes are stored in a flat arena
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    side_length: u32,
    max_level: u8,
}

impl QuadTree {
    /// Create a tree holding a single root leaf spanning the grid
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `side_length` is not an accepted power of two
    pub fn new(side_length: u32) -> Result<Self> {
        let max_level = validate_side_length(side_length)?;
        let mut tree = Self {
            nodes: Vec::new(),
            side_length,
            max_level,
        };
        tree.reset();
        Ok(tree)
    }

    /// Discard every node and reinstate the root leaf
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes
            .push(Node::leaf(0, Region::new(0, 0, self.side_length)));
    }

    /// Grid side length
    pub const fn side_length(&self) -> u32 {
        self.side_length
    }

    /// Depth of unit regions, `log2(side_length)`
    pub const fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Number of nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Iterate over every node with its id, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }

    /// Iterate over every childless node, live or retired
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.iter().filter(|(_, node)| node.is_leaf())
    }

    /// Convert a live leaf into an interior node with four fresh leaf children
    ///
    /// # Errors
    ///
    /// Returns an invalid operation error if the node does not exist, is
    /// already interior, is retired, or is a unit region
    pub fn split(&mut self, id: NodeId) -> Result<[NodeId; 4]> {
        let node = *self
            .node(id)
            .ok_or_else(|| invalid_operation("split", &format!("node {id} does not exist")))?;

        match node.kind {
            NodeKind::Interior { .. } => {
                return Err(invalid_operation(
                    "split",
                    &format!("node {id} is already an interior node"),
                ));
            }
            NodeKind::Retired => {
                return Err(invalid_operation(
                    "split",
                    &format!("node {id} has been retired"),
                ));
            }
            NodeKind::Leaf => {}
        }
        if node.is_terminal() {
            return Err(invalid_operation(
                "split",
                &format!("node {id} is a unit region"),
            ));
        }

        let first = self.nodes.len() as u32;
        let children = [
            NodeId(first),
            NodeId(first + 1),
            NodeId(first + 2),
            NodeId(first + 3),
        ];
        for quadrant in node.region.quadrants() {
            self.nodes.push(Node::leaf(node.depth + 1, quadrant));
        }
        if let Some(parent) = self.nodes.get_mut(id.index()) {
            parent.kind = NodeKind::Interior { children };
        }

        Ok(children)
    }

    /// Permanently exclude a live unit leaf from refinement
    ///
    /// # Errors
    ///
    /// Returns an invalid operation error if the node does not exist, is not
    /// a live leaf, or covers more than one pixel
    pub fn retire(&mut self, id: NodeId) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or_else(|| invalid_operation("retire", &format!("node {id} does not exist")))?;

        if node.kind != NodeKind::Leaf {
            return Err(invalid_operation(
                "retire",
                &format!("node {id} is not a live leaf"),
            ));
        }
        if !node.is_terminal() {
            return Err(invalid_operation(
                "retire",
                &format!("node {id} spans {} pixels", node.region.area()),
            ));
        }

        node.kind = NodeKind::Retired;
        Ok(())
    }
}
