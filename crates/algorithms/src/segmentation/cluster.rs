//! Region merging
//!
//! Leaves are visited largest first. Each unclustered leaf seeds a
//! cluster, then its neighbours are pulled in (or their clusters merged)
//! whenever the merge criterion accepts the shared border.

use super::adjacency::{leaves_by_area, Adjacency};
use super::progress::{Progress, Ticker};
use super::quadtree::{NodeId, QuadTree, Rect};
use hyperseg_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Cluster label. Ids start at 1; 0 means "unassigned" in label rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub u32);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decides whether two adjacent regions belong together
pub trait MergeCriterion {
    fn can_merge(&self, a: &Rect, b: &Rect) -> Result<bool>;
}

impl<F> MergeCriterion for F
where
    F: Fn(&Rect, &Rect) -> Result<bool>,
{
    fn can_merge(&self, a: &Rect, b: &Rect) -> Result<bool> {
        self(a, b)
    }
}

/// Cluster id to member leaves.
///
/// The tree's `cluster_id` fields mirror this table: every clustered
/// leaf names a present key and appears in exactly that key's list.
#[derive(Debug, Clone)]
pub struct ClusterTable {
    clusters: BTreeMap<ClusterId, Vec<NodeId>>,
    next_id: u32,
}

impl Default for ClusterTable {
    fn default() -> Self {
        Self {
            clusters: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl ClusterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cluster with `leaf` as its only member
    pub fn new_cluster(&mut self, tree: &mut QuadTree, leaf: NodeId) -> ClusterId {
        self.detach(tree, leaf);
        let id = ClusterId(self.next_id);
        self.next_id += 1;
        self.clusters.insert(id, vec![leaf]);
        tree.set_cluster_id(leaf, Some(id));
        id
    }

    /// Append `leaf` to the existing cluster `id`
    pub fn add_to_cluster(&mut self, tree: &mut QuadTree, id: ClusterId, leaf: NodeId) -> Result<()> {
        if tree.cluster_id(leaf) == Some(id) {
            return Ok(());
        }
        if !self.clusters.contains_key(&id) {
            return Err(unknown(id));
        }
        self.detach(tree, leaf);
        self.clusters.entry(id).or_default().push(leaf);
        tree.set_cluster_id(leaf, Some(id));
        Ok(())
    }

    /// Merge the smaller of two clusters into the larger and return the
    /// survivor. On equal sizes `b` is merged into `a`.
    pub fn merge_clusters(&mut self, tree: &mut QuadTree, a: ClusterId, b: ClusterId) -> Result<ClusterId> {
        if a == b {
            return if self.contains(a) { Ok(a) } else { Err(unknown(a)) };
        }
        let len_a = self.clusters.get(&a).ok_or_else(|| unknown(a))?.len();
        let len_b = self.clusters.get(&b).ok_or_else(|| unknown(b))?.len();
        let (survivor, absorbed) = if len_b > len_a { (b, a) } else { (a, b) };

        let moved = self.clusters.remove(&absorbed).unwrap_or_default();
        for &leaf in &moved {
            tree.set_cluster_id(leaf, Some(survivor));
        }
        self.clusters.entry(survivor).or_default().extend(moved);
        Ok(survivor)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn contains(&self, id: ClusterId) -> bool {
        self.clusters.contains_key(&id)
    }

    pub fn members(&self, id: ClusterId) -> Option<&[NodeId]> {
        self.clusters.get(&id).map(Vec::as_slice)
    }

    /// Live cluster ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &[NodeId])> + '_ {
        self.clusters.iter().map(|(&id, m)| (id, m.as_slice()))
    }

    /// Remove `leaf` from whatever cluster currently holds it, dropping
    /// the cluster when it empties.
    fn detach(&mut self, tree: &mut QuadTree, leaf: NodeId) {
        let Some(old) = tree.cluster_id(leaf) else {
            return;
        };
        if let Some(members) = self.clusters.get_mut(&old) {
            members.retain(|&m| m != leaf);
            if members.is_empty() {
                self.clusters.remove(&old);
            }
        }
        tree.set_cluster_id(leaf, None);
    }
}

fn unknown(id: ClusterId) -> Error {
    Error::Algorithm(format!("unknown cluster {}", id))
}

/// Greedily merge adjacent leaves.
///
/// Leaves are taken in descending area order. A neighbour already in the
/// current leaf's cluster is skipped; otherwise `criterion` decides, and
/// an accepted neighbour either joins the cluster or has its own cluster
/// merged with it. Criterion errors abort the run.
///
/// Cluster ids left on the tree by an earlier run are cleared first, so
/// the returned table is the only one the tree refers to.
pub fn do_cluster<C>(
    tree: &mut QuadTree,
    adjacency: &Adjacency,
    criterion: &C,
    progress: &mut dyn Progress,
) -> Result<ClusterTable>
where
    C: MergeCriterion + ?Sized,
{
    let order = leaves_by_area(tree);
    for &leaf in &order {
        tree.set_cluster_id(leaf, None);
    }
    let mut table = ClusterTable::new();
    let ticker = Ticker::new(order.len());

    for (done, &q1) in order.iter().enumerate() {
        if tree.cluster_id(q1).is_none() {
            table.new_cluster(tree, q1);
        }

        for &q2 in adjacency.neighbors(q1) {
            // A merge may have renamed q1's cluster.
            let c1 = tree
                .cluster_id(q1)
                .ok_or_else(|| Error::Algorithm("seed leaf lost its cluster".into()))?;
            let c2 = tree.cluster_id(q2);
            if c2 == Some(c1) {
                continue;
            }
            if !criterion.can_merge(&tree.rect(q1), &tree.rect(q2))? {
                continue;
            }
            match c2 {
                Some(c2) => {
                    table.merge_clusters(tree, c1, c2)?;
                }
                None => table.add_to_cluster(tree, c1, q2)?,
            }
        }

        ticker.tick(done + 1, progress);
    }

    Ok(table)
}
