//! Label rasters from a segmented quadtree

use super::quadtree::{QuadTree, Rect};
use hyperseg_core::{GeoTransform, Raster};
use ndarray::s;

fn paint(raster: &mut Raster<i32>, rect: Rect, value: i32) {
    raster
        .data_mut()
        .slice_mut(s![rect.y0..rect.y1, rect.x0..rect.x1])
        .fill(value);
}

fn blank(tree: &QuadTree, transform: GeoTransform) -> Raster<i32> {
    let extent = tree.extent();
    let mut raster = Raster::new(extent.y1, extent.x1);
    raster.set_transform(transform);
    raster
}

/// Paint each leaf with its 1-based ordinal in [`QuadTree::leaves`] order
pub fn rasterize_leaves(tree: &QuadTree, transform: GeoTransform) -> Raster<i32> {
    let mut raster = blank(tree, transform);
    for (ordinal, leaf) in tree.leaves().into_iter().enumerate() {
        paint(&mut raster, tree.rect(leaf), ordinal as i32 + 1);
    }
    raster
}

/// Paint each leaf with its cluster id; unclustered leaves stay 0
pub fn rasterize_clusters(tree: &QuadTree, transform: GeoTransform) -> Raster<i32> {
    let mut raster = blank(tree, transform);
    for leaf in tree.leaves() {
        if let Some(id) = tree.cluster_id(leaf) {
            paint(&mut raster, tree.rect(leaf), id.0 as i32);
        }
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::cluster::ClusterTable;
    use crate::segmentation::quadtree::Quadrant;

    fn halves() -> QuadTree {
        let mut tree = QuadTree::new(Rect::new(0, 4, 0, 2));
        let root = tree.root();
        tree.subdivide(
            root,
            &[
                (Quadrant::UpperLeft, Rect::new(0, 1, 0, 2)),
                (Quadrant::UpperRight, Rect::new(1, 4, 0, 2)),
            ],
        );
        tree
    }

    #[test]
    fn test_leaf_ordinals() {
        let tree = halves();
        let r = rasterize_leaves(&tree, GeoTransform::default());
        assert_eq!(r.shape(), (2, 4));
        assert_eq!(r.get(0, 0).unwrap(), 1);
        assert_eq!(r.get(1, 0).unwrap(), 1);
        assert_eq!(r.get(1, 3).unwrap(), 2);
    }

    #[test]
    fn test_cluster_labels() {
        let mut tree = halves();
        let leaves = tree.leaves();
        let mut table = ClusterTable::new();
        let id = table.new_cluster(&mut tree, leaves[1]);

        let transform = GeoTransform::new(100.0, 200.0, 2.0, -2.0);
        let r = rasterize_clusters(&tree, transform);
        assert_eq!(r.get(0, 0).unwrap(), 0);
        assert_eq!(r.get(0, 2).unwrap(), id.0 as i32);
        assert_eq!(r.transform(), &transform);
    }
}
