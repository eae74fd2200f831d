use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelRegistryError {
    #[error("failed to read labels {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write labels {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid labels file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("labels file {path} maps more than one name to id {id}")]
    DuplicateId { path: PathBuf, id: i32 },
}

/// Lower-cases a subject directory name and replaces spaces with hyphens.
pub fn normalize_label(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Dense name-to-id mapping; ids start at 0 and follow first registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelRegistry {
    ids: BTreeMap<String, i32>,
    names: Vec<String>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `label`, assigning the next free one if unseen.
    /// `label` must already be normalized.
    pub fn get_or_assign(&mut self, label: &str) -> i32 {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.names.len() as i32;
        self.ids.insert(label.to_string(), id);
        self.names.push(label.to_string());
        id
    }

    pub fn id(&self, label: &str) -> Option<i32> {
        self.ids.get(label).copied()
    }

    pub fn name(&self, id: i32) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Labels in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Writes `{"name": id, ...}` with keys sorted.
    pub fn save(&self, path: &Path) -> Result<(), LabelRegistryError> {
        let json = serde_json::to_string_pretty(&self.ids).map_err(|e| {
            LabelRegistryError::Format {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        fs::write(path, json).map_err(|e| LabelRegistryError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self, LabelRegistryError> {
        let json = fs::read_to_string(path).map_err(|e| LabelRegistryError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let ids: BTreeMap<String, i32> =
            serde_json::from_str(&json).map_err(|e| LabelRegistryError::Format {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut by_id: BTreeMap<i32, String> = BTreeMap::new();
        for (name, &id) in &ids {
            if by_id.insert(id, name.clone()).is_some() {
                return Err(LabelRegistryError::DuplicateId {
                    path: path.to_path_buf(),
                    id,
                });
            }
        }
        // Ids written by this crate are dense; a sparse file keeps its names
        // reachable through `id` even though `name` only covers the dense prefix.
        let names = by_id
            .into_iter()
            .enumerate()
            .take_while(|(i, (id, _))| *id == *i as i32)
            .map(|(_, (_, name))| name)
            .collect();
        Ok(Self { ids, names })
    }
}
