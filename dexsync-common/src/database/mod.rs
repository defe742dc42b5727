pub mod collection;

pub use collection::{load_collection, load_index, load_required, save_collection, sort_by_id};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File names of the dataset, relative to the data directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FileNames {
    pub list: String,
    pub detailed: String,
    pub sets: String,
    pub series: String,
}

impl Default for FileNames {
    fn default() -> FileNames {
        FileNames {
            list: "pokemon_list.json".to_string(),
            detailed: "pokemon_cards_detailed.json".to_string(),
            sets: "pokemon_sets.json".to_string(),
            series: "pokemon_series.json".to_string(),
        }
    }
}

/// Resolved paths of every file in the dataset.
#[derive(Debug, Clone)]
pub struct DataFiles {
    pub dir: PathBuf,
    pub list: PathBuf,
    pub detailed: PathBuf,
    pub sets: PathBuf,
    pub series: PathBuf,
}

impl DataFiles {
    pub fn new(dir: &Path, names: &FileNames) -> DataFiles {
        DataFiles {
            dir: dir.to_path_buf(),
            list: dir.join(&names.list),
            detailed: dir.join(&names.detailed),
            sets: dir.join(&names.sets),
            series: dir.join(&names.series),
        }
    }

    pub fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            info!("Creating data directory {}", self.dir.display());
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Every file with a short label, series first and detailed cards last.
    pub fn labelled(&self) -> [(&'static str, &Path); 4] {
        [
            ("series", self.series.as_path()),
            ("sets", self.sets.as_path()),
            ("card list", self.list.as_path()),
            ("detailed cards", self.detailed.as_path()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_files_join_names_onto_dir() {
        let files = DataFiles::new(Path::new("assets/data"), &FileNames::default());
        assert_eq!(files.list, Path::new("assets/data/pokemon_list.json"));
        assert_eq!(
            files.detailed,
            Path::new("assets/data/pokemon_cards_detailed.json")
        );
        assert_eq!(files.labelled()[0].1, files.series.as_path());
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let files = DataFiles::new(&root.path().join("a/b"), &FileNames::default());
        files.ensure_dir().unwrap();
        assert!(files.dir.is_dir());
    }
}
