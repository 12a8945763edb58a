//! Quadtree arena over half-open pixel rectangles

use super::cluster::ClusterId;
use hyperseg_core::error::Bounds;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
///
/// `x` runs along samples (columns) and `y` along lines (rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl Rect {
    /// # Panics
    /// If the rectangle is empty (`x0 >= x1` or `y0 >= y1`).
    pub fn new(x0: usize, x1: usize, y0: usize, y1: usize) -> Self {
        assert!(
            x0 < x1 && y0 < y1,
            "degenerate rectangle x {}..{}, y {}..{}",
            x0,
            x1,
            y0,
            y1
        );
        Self { x0, x1, y0, y1 }
    }

    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_unit(&self) -> bool {
        self.width() == 1 && self.height() == 1
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }

    pub fn bounds(&self) -> Bounds {
        (self.x0, self.x1, self.y0, self.y1)
    }
}

/// Index of a node in its [`QuadTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Child slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    UpperLeft = 0,
    UpperRight = 1,
    LowerLeft = 2,
    LowerRight = 3,
}

/// One region of the partition.
///
/// An x-only split fills the upper-left (left half) and upper-right
/// (right half) slots, a y-only split the upper-left (top) and
/// lower-left (bottom) slots, a quadrant split all four.
#[derive(Debug, Clone)]
pub struct QuadNode {
    rect: Rect,
    is_leaf: bool,
    children: [Option<NodeId>; 4],
    cluster_id: Option<ClusterId>,
}

impl QuadNode {
    fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            is_leaf: true,
            children: [None; 4],
            cluster_id: None,
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<NodeId> {
        self.children[quadrant as usize]
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        self.cluster_id
    }
}

/// Arena-backed quadtree. Node 0 is the root; children are owned by
/// exactly one parent and parents are not recorded.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
}

impl QuadTree {
    /// A tree holding a single leaf covering `extent`
    pub fn new(extent: Rect) -> Self {
        Self {
            nodes: vec![QuadNode::leaf(extent)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn extent(&self) -> Rect {
        self.nodes[0].rect
    }

    /// Total node count, internal nodes included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id.index()]
    }

    pub fn rect(&self, id: NodeId) -> Rect {
        self.nodes[id.index()].rect
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].is_leaf
    }

    pub fn cluster_id(&self, id: NodeId) -> Option<ClusterId> {
        self.nodes[id.index()].cluster_id
    }

    pub(crate) fn set_cluster_id(&mut self, id: NodeId, cluster: Option<ClusterId>) {
        self.nodes[id.index()].cluster_id = cluster;
    }

    /// Occupied child slots in slot order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.index()].children.iter().flatten().copied()
    }

    /// Leaves in depth-first, slot order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.is_leaf(id) {
                leaves.push(id);
            } else {
                let children: Vec<NodeId> = self.children(id).collect();
                stack.extend(children.into_iter().rev());
            }
        }
        leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Leaf containing pixel `(x, y)`, found by descending from the root
    pub fn locate(&self, x: usize, y: usize) -> Option<NodeId> {
        let mut id = self.root();
        if !self.rect(id).contains(x, y) {
            return None;
        }
        while !self.is_leaf(id) {
            id = self.children(id).find(|&c| self.rect(c).contains(x, y))?;
        }
        Some(id)
    }

    /// Turn leaf `id` into an internal node owning `parts`.
    ///
    /// The parts must tile the node's rectangle.
    pub(crate) fn subdivide(&mut self, id: NodeId, parts: &[(Quadrant, Rect)]) -> Vec<NodeId> {
        debug_assert!(self.is_leaf(id));
        debug_assert_eq!(
            parts.iter().map(|(_, r)| r.area()).sum::<usize>(),
            self.rect(id).area()
        );

        let mut created = Vec::with_capacity(parts.len());
        for &(quadrant, rect) in parts {
            let child = NodeId(self.nodes.len() as u32);
            self.nodes.push(QuadNode::leaf(rect));
            self.nodes[id.index()].children[quadrant as usize] = Some(child);
            created.push(child);
        }
        self.nodes[id.index()].is_leaf = false;
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let r = Rect::new(2, 6, 1, 4);
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 3);
        assert_eq!(r.area(), 12);
        assert!(r.contains(2, 1));
        assert!(!r.contains(6, 1));
        assert!(!Rect::new(0, 1, 0, 2).is_unit());
        assert!(Rect::new(3, 4, 5, 6).is_unit());
    }

    #[test]
    #[should_panic(expected = "degenerate rectangle")]
    fn test_empty_rect_panics() {
        Rect::new(3, 3, 0, 1);
    }

    #[test]
    fn test_subdivide_and_locate() {
        let mut tree = QuadTree::new(Rect::new(0, 4, 0, 4));
        let root = tree.root();
        let kids = tree.subdivide(
            root,
            &[
                (Quadrant::UpperLeft, Rect::new(0, 2, 0, 4)),
                (Quadrant::UpperRight, Rect::new(2, 4, 0, 4)),
            ],
        );

        assert!(!tree.is_leaf(root));
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.leaves(), kids);
        assert_eq!(tree.node(root).child(Quadrant::UpperRight), Some(kids[1]));
        assert_eq!(tree.node(root).child(Quadrant::LowerLeft), None);
        assert_eq!(tree.locate(3, 3), Some(kids[1]));
        assert_eq!(tree.locate(1, 0), Some(kids[0]));
        assert_eq!(tree.locate(4, 0), None);
    }

    #[test]
    fn test_leaves_follow_slot_order() {
        let mut tree = QuadTree::new(Rect::new(0, 2, 0, 2));
        let kids = tree.subdivide(
            tree.root(),
            &[
                (Quadrant::UpperLeft, Rect::new(0, 1, 0, 1)),
                (Quadrant::UpperRight, Rect::new(1, 2, 0, 1)),
                (Quadrant::LowerLeft, Rect::new(0, 1, 1, 2)),
                (Quadrant::LowerRight, Rect::new(1, 2, 1, 2)),
            ],
        );
        let grandkids = tree.subdivide(
            kids[0],
            &[(Quadrant::UpperLeft, Rect::new(0, 1, 0, 1))],
        );
        assert_eq!(tree.leaves(), vec![grandkids[0], kids[1], kids[2], kids[3]]);
    }
}
