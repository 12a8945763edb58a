//! Leaf adjacency
//!
//! Two builders produce the same relation: a pairwise rectangle test,
//! cheap when there are few leaves, and a pixel scan that costs one
//! point location per pixel regardless of the leaf count. Each touching
//! pair is stored once, directed from the larger leaf to the smaller.

use super::quadtree::{NodeId, QuadTree, Rect};
use hyperseg_core::Error;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

/// Where the other rectangle lies relative to this one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Above,
    Below,
}

/// Shared edge between two touching rectangles.
///
/// `start..end` is the overlap along the edge: lines for `Left`/`Right`,
/// samples for `Above`/`Below`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub side: Side,
    pub start: usize,
    pub end: usize,
}

impl Border {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

fn overlap(a0: usize, a1: usize, b0: usize, b1: usize) -> Option<(usize, usize)> {
    let lo = a0.max(b0);
    let hi = a1.min(b1);
    (lo < hi).then_some((lo, hi))
}

impl Rect {
    /// The edge shared with `other`, if the two touch along a segment.
    /// Corner contact and overlap do not count.
    pub fn border_with(&self, other: &Rect) -> Option<Border> {
        let along_y = || overlap(self.y0, self.y1, other.y0, other.y1);
        let along_x = || overlap(self.x0, self.x1, other.x0, other.x1);

        let (side, (start, end)) = if self.x1 == other.x0 {
            (Side::Right, along_y()?)
        } else if other.x1 == self.x0 {
            (Side::Left, along_y()?)
        } else if self.y1 == other.y0 {
            (Side::Below, along_x()?)
        } else if other.y1 == self.y0 {
            (Side::Above, along_x()?)
        } else {
            return None;
        };
        Some(Border { side, start, end })
    }

    pub fn touches(&self, other: &Rect) -> bool {
        self.border_with(other).is_some()
    }
}

/// Neighbour lists keyed by every leaf of a tree
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    neighbors: BTreeMap<NodeId, Vec<NodeId>>,
}

impl Adjacency {
    fn with_leaves(tree: &QuadTree) -> Self {
        Self {
            neighbors: tree.leaves().into_iter().map(|id| (id, Vec::new())).collect(),
        }
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId) {
        self.neighbors.entry(from).or_default().push(to);
    }

    /// Every leaf, including ones with no neighbours
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors.keys().copied()
    }

    /// Neighbours registered on `id`; empty for unknown ids
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.neighbors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.values().map(Vec::len).sum()
    }

    /// Directed edges `(from, to)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.neighbors
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
    }

    /// Whether an edge exists between `a` and `b` in either direction
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).contains(&b) || self.neighbors(b).contains(&a)
    }
}

/// Which adjacency builder the driver uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjacencyMethod {
    /// O(n²) rectangle tests over all leaf pairs
    Pairwise,
    /// One point location per pixel
    #[default]
    PixelScan,
}

impl AdjacencyMethod {
    pub fn build(&self, tree: &QuadTree) -> Adjacency {
        match self {
            AdjacencyMethod::Pairwise => adjacency_pairwise(tree),
            AdjacencyMethod::PixelScan => adjacency_pixel_scan(tree),
        }
    }
}

impl FromStr for AdjacencyMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "pairwise" => Ok(AdjacencyMethod::Pairwise),
            "pixel-scan" | "scan" => Ok(AdjacencyMethod::PixelScan),
            _ => Err(Error::InvalidParameter {
                name: "adjacency",
                value: s.to_string(),
                reason: "expected pairwise or pixel-scan".to_string(),
            }),
        }
    }
}

/// Leaves sorted by descending area; equal areas keep tree order
pub(crate) fn leaves_by_area(tree: &QuadTree) -> Vec<NodeId> {
    let mut leaves = tree.leaves();
    leaves.sort_by_key(|&id| Reverse(tree.rect(id).area()));
    leaves
}

/// Test every unordered pair of leaves.
///
/// Edges point from the earlier leaf in descending-area order.
pub fn adjacency_pairwise(tree: &QuadTree) -> Adjacency {
    let leaves = leaves_by_area(tree);
    let mut adjacency = Adjacency::with_leaves(tree);

    for (i, &a) in leaves.iter().enumerate() {
        let ra = tree.rect(a);
        for &b in &leaves[i + 1..] {
            if ra.touches(&tree.rect(b)) {
                adjacency.insert_edge(a, b);
            }
        }
    }
    adjacency
}

/// Scan horizontally then vertically adjacent pixel pairs.
///
/// The larger leaf owns the edge; on equal areas the left or upper
/// leaf of the first pair that reveals the contact owns it.
pub fn adjacency_pixel_scan(tree: &QuadTree) -> Adjacency {
    let extent = tree.extent();
    let mut adjacency = Adjacency::with_leaves(tree);
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();

    let mut link = |a: NodeId, b: NodeId| {
        if a == b {
            return;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        if !seen.insert(key) {
            return;
        }
        if tree.rect(a).area() >= tree.rect(b).area() {
            adjacency.insert_edge(a, b);
        } else {
            adjacency.insert_edge(b, a);
        }
    };

    for y in extent.y0..extent.y1 {
        let mut left = tree.locate(extent.x0, y);
        for x in extent.x0 + 1..extent.x1 {
            let right = tree.locate(x, y);
            if let (Some(a), Some(b)) = (left, right) {
                link(a, b);
            }
            left = right;
        }
    }

    for x in extent.x0..extent.x1 {
        let mut upper = tree.locate(x, extent.y0);
        for y in extent.y0 + 1..extent.y1 {
            let lower = tree.locate(x, y);
            if let (Some(a), Some(b)) = (upper, lower) {
                link(a, b);
            }
            upper = lower;
        }
    }

    adjacency
}
