use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use burn::data::dataset::{Dataset, InMemDataset};
use serde::{Deserialize, Serialize};

use crate::data::record::{ArrayData, Record};
use crate::error::LoadError;

/// Source of raw records. Identifiers come from the caller, the loader never
/// discovers them.
pub trait SequenceLoader {
    /// `with_grid` is set when the atmospheric grid is needed; loaders may
    /// skip reading it otherwise.
    fn load(&self, id: &str, with_grid: bool) -> Result<Record, LoadError>;
}

impl<L: SequenceLoader + ?Sized> SequenceLoader for &L {
    fn load(&self, id: &str, with_grid: bool) -> Result<Record, LoadError> {
        (**self).load(id, with_grid)
    }
}

/// On-disk layout of one record document.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecordItem {
    #[serde(default)]
    pub id: String,
    pub track: ArrayData,
    pub grid: Option<ArrayData>,
}

impl RecordItem {
    fn into_record(self, id: &str, with_grid: bool) -> Result<Record, LoadError> {
        let grid = if with_grid { self.grid } else { None };
        Record::new(id, self.track, grid)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryLoader {
    records: HashMap<String, Record>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id().to_string(), record);
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl FromIterator<Record> for InMemoryLoader {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut loader = Self::new();
        for record in iter {
            loader.insert(record);
        }
        loader
    }
}

impl SequenceLoader for InMemoryLoader {
    fn load(&self, id: &str, with_grid: bool) -> Result<Record, LoadError> {
        let record = self
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| LoadError::Missing(id.to_string()))?;
        Ok(if with_grid { record } else { record.without_grid() })
    }
}

/// One JSON document per record; the id is the document path relative to `root`.
#[derive(Debug, Clone)]
pub struct JsonFileLoader {
    root: PathBuf,
}

impl JsonFileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SequenceLoader for JsonFileLoader {
    fn load(&self, id: &str, with_grid: bool) -> Result<Record, LoadError> {
        let path = self.root.join(id);
        let raw = fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::Missing(id.to_string()),
            _ => LoadError::Io {
                id: id.to_string(),
                source,
            },
        })?;

        let item: RecordItem =
            serde_json::from_str(&raw).map_err(|err| LoadError::Malformed {
                id: id.to_string(),
                reason: err.to_string(),
            })?;

        item.into_record(id, with_grid)
    }
}

/// Every record in one JSON-rows file, held in memory and looked up by `id`.
pub struct JsonRowsLoader {
    dataset: InMemDataset<RecordItem>,
    index: HashMap<String, usize>,
}

impl JsonRowsLoader {
    pub fn from_file(filename: &str) -> Result<Self, LoadError> {
        let dataset = InMemDataset::from_json_rows(filename).map_err(|source| LoadError::Io {
            id: filename.to_string(),
            source,
        })?;
        Ok(Self::from_dataset(dataset))
    }

    pub fn from_dataset(dataset: InMemDataset<RecordItem>) -> Self {
        let index = dataset
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id, position))
            .collect();
        Self { dataset, index }
    }

    /// Record ids in file order.
    pub fn ids(&self) -> Vec<String> {
        self.dataset.iter().map(|item| item.id).collect()
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

impl SequenceLoader for JsonRowsLoader {
    fn load(&self, id: &str, with_grid: bool) -> Result<Record, LoadError> {
        self.index
            .get(id)
            .and_then(|position| self.dataset.get(*position))
            .ok_or_else(|| LoadError::Missing(id.to_string()))?
            .into_record(id, with_grid)
    }
}
