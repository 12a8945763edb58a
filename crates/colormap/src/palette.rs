//! Per-class colour tables written next to label rasters

use crate::scheme::{evaluate, ColorScheme, Rgb};
use hyperseg_core::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Stable pseudo-random colour for a class id. Id 0 is black.
pub fn class_color(id: u32) -> Rgb {
    if id == 0 {
        return Rgb::BLACK;
    }
    let mut rng = StdRng::seed_from_u64(u64::from(id));
    Rgb::new(rng.random(), rng.random(), rng.random())
}

/// Colour for a region by its share of the largest region's area
pub fn area_color(area: usize, max_area: usize) -> Rgb {
    if max_area == 0 {
        return evaluate(ColorScheme::Area, 0.0);
    }
    evaluate(ColorScheme::Area, area as f64 / max_area as f64)
}

/// `labels.tif` -> `labels.tif.classes.json`
pub fn sidecar_path(raster: &Path) -> PathBuf {
    let mut name = raster.as_os_str().to_os_string();
    name.push(".classes.json");
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: u32,
    pub name: String,
    pub color: Rgb,
}

/// Names and colours for every id that can appear in a label raster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTable {
    pub classes: Vec<ClassEntry>,
}

impl ClassTable {
    /// Table for cluster ids, with `Unclassified` for id 0 first
    pub fn for_clusters<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut ids: Vec<u32> = ids.into_iter().filter(|&id| id != 0).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut classes = Vec::with_capacity(ids.len() + 1);
        classes.push(ClassEntry {
            id: 0,
            name: "Unclassified".to_string(),
            color: class_color(0),
        });
        classes.extend(ids.into_iter().map(|id| ClassEntry {
            id,
            name: format!("Cluster {}", id),
            color: class_color(id),
        }));
        Self { classes }
    }

    /// Table for leaf ordinals coloured by area; `areas[i]` belongs to leaf `i + 1`
    pub fn for_leaves(areas: &[usize]) -> Self {
        let max_area = areas.iter().copied().max().unwrap_or(0);
        let classes = areas
            .iter()
            .enumerate()
            .map(|(i, &area)| ClassEntry {
                id: i as u32 + 1,
                name: format!("Leaf {} ({} px)", i + 1, area),
                color: area_color(area, max_area),
            })
            .collect();
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&ClassEntry> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(format!("class table: {}", e)))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Other(format!("class table: {}", e)))
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_colors_are_stable() {
        assert_eq!(class_color(7), class_color(7));
        assert_eq!(class_color(0), Rgb::BLACK);
        let distinct: std::collections::HashSet<Rgb> = (1..50).map(class_color).collect();
        assert!(distinct.len() > 40);
    }

    #[test]
    fn cluster_table_layout() {
        let table = ClassTable::for_clusters([5, 2, 2, 0]);
        let ids: Vec<u32> = table.classes.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 2, 5]);
        assert_eq!(table.get(0).unwrap().name, "Unclassified");
        assert_eq!(table.get(5).unwrap().name, "Cluster 5");
        assert_eq!(table.get(5).unwrap().color, class_color(5));
    }

    #[test]
    fn leaf_table_uses_area_ramp() {
        let table = ClassTable::for_leaves(&[16, 4, 16]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1).unwrap().color, evaluate(ColorScheme::Area, 1.0));
        assert_eq!(table.get(2).unwrap().color, evaluate(ColorScheme::Area, 0.25));
        assert!(ClassTable::for_leaves(&[]).is_empty());
    }

    #[test]
    fn sidecar_name() {
        assert_eq!(
            sidecar_path(Path::new("out/labels.tif")),
            PathBuf::from("out/labels.tif.classes.json")
        );
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.tif.classes.json");
        let table = ClassTable::for_clusters([1, 3]);
        table.write_json(&path).unwrap();
        assert_eq!(ClassTable::read_json(&path).unwrap(), table);
        assert!(ClassTable::from_json("not json").is_err());
    }
}
