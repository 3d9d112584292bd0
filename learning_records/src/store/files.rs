//! CSV file backend.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Storage, TabularStore};
use crate::error::{Result, StoreError, Table};
use crate::records::{
    ConfidenceEntry, Resource, ResourceRow, StudentRecord, StudentRow, StudyPlanEntry, TopicRelation,
};

/// Header names accepted for the YouTube link column, in priority order.
const YOUTUBE_HEADERS: &[&str] = &["youtube", "youtube_link", "youtube_url", "yt", "video"];

/// Header names accepted for the documentation link column, in priority order.
const DOCS_HEADERS: &[&str] = &[
    "docs",
    "documentation_link",
    "documentation",
    "docs_link",
    "documentation_url",
    "doc",
];

/// Where each table lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Directory holding all table files.
    pub dir: PathBuf,
    pub topic_graph: String,
    pub students: String,
    pub history: String,
    pub resources: String,
    pub study_plan: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            topic_graph: "topic_graph.csv".to_string(),
            students: "student_data.csv".to_string(),
            history: "history.csv".to_string(),
            resources: "resources.csv".to_string(),
            study_plan: "study_plan.csv".to_string(),
        }
    }
}

impl DataPaths {
    /// Default file names under a given directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Full path of a table file.
    pub fn path(&self, table: Table) -> PathBuf {
        let name = match table {
            Table::TopicGraph => &self.topic_graph,
            Table::Students => &self.students,
            Table::History => &self.history,
            Table::Resources => &self.resources,
            Table::StudyPlan => &self.study_plan,
        };
        self.dir.join(name)
    }
}

/// Storage backed by one CSV file per table.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    paths: DataPaths,
}

impl CsvStorage {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn open(&self, table: Table) -> Result<(PathBuf, csv::Reader<File>)> {
        let path = self.paths.path(table);
        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::Missing {
                table,
                path: path.clone(),
            },
            _ => StoreError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
        Ok((path, reader))
    }

    fn read_table<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>> {
        let (path, mut reader) = self.open(table)?;
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<T>, _>>()
            .map_err(|source| StoreError::Read {
                table,
                path: path.clone(),
                source,
            })?;
        debug!(%table, path = %path.display(), rows = rows.len(), "Loaded table");
        Ok(rows)
    }

    fn read_topic_graph(&self) -> Result<Vec<TopicRelation>> {
        let relations: Vec<TopicRelation> = self.read_table(Table::TopicGraph)?;
        let total = relations.len();
        let kept: Vec<_> = relations
            .into_iter()
            .filter(|r| !r.topic.is_empty())
            .collect();
        if kept.len() < total {
            warn!(skipped = total - kept.len(), "Skipped topic graph rows without a topic");
        }
        Ok(kept)
    }

    fn read_resources(&self) -> Result<Vec<Resource>> {
        let table = Table::Resources;
        let (path, mut reader) = self.open(table)?;
        let read_err = |source| StoreError::Read {
            table,
            path: path.clone(),
            source,
        };

        let headers = normalize_resource_headers(reader.headers().map_err(read_err)?);
        let mut resources = Vec::new();
        for record in reader.records() {
            let row: ResourceRow = record
                .and_then(|r| r.deserialize(Some(&headers)))
                .map_err(read_err)?;
            resources.push(Resource::from(row));
        }
        debug!(path = %path.display(), rows = resources.len(), "Loaded resources");
        Ok(resources)
    }

    fn write_table<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<()> {
        let path = self.paths.path(table);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Write beside the target and swap it in, so a failed write leaves
        // the previous table in place.
        let staged = staged_path(&path);
        let swapped = write_staged(table, &staged, rows).and_then(|()| {
            fs::rename(&staged, &path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })
        });
        if let Err(e) = swapped {
            if let Err(cleanup) = fs::remove_file(&staged) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %staged.display(), error = %cleanup, "Failed to remove staged table");
                }
            }
            return Err(e);
        }
        info!(%table, path = %path.display(), rows = rows.len(), "Persisted table");
        Ok(())
    }
}

impl Storage for CsvStorage {
    fn load(&self) -> Result<TabularStore> {
        let students: Vec<StudentRow> = self.read_table(Table::Students)?;
        let store = TabularStore {
            topic_relations: self.read_topic_graph()?,
            students: students.into_iter().map(StudentRecord::from).collect(),
            history: self.read_table(Table::History)?,
            resources: self.read_resources()?,
            study_plan: self.load_study_plan()?.unwrap_or_default(),
        };
        info!(
            dir = %self.paths.dir.display(),
            relations = store.topic_relations.len(),
            students = store.students.len(),
            history = store.history.len(),
            "Loaded tables"
        );
        Ok(store)
    }

    fn save_history(&self, history: &[ConfidenceEntry]) -> Result<()> {
        self.write_table(Table::History, history)
    }

    fn save_study_plan(&self, plan: &[StudyPlanEntry]) -> Result<()> {
        self.write_table(Table::StudyPlan, plan)
    }

    fn load_study_plan(&self) -> Result<Option<Vec<StudyPlanEntry>>> {
        match self.read_table(Table::StudyPlan) {
            Ok(plan) => Ok(Some(plan)),
            Err(StoreError::Missing { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn write_staged<T: Serialize>(table: Table, staged: &Path, rows: &[T]) -> Result<()> {
    let write_err = |source| StoreError::Write {
        table,
        path: staged.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(staged).map_err(write_err)?;
    for row in rows {
        writer.serialize(row).map_err(write_err)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: staged.to_path_buf(),
        source,
    })
}

fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Rename aliased link columns to the canonical `youtube` and `docs` names.
///
/// For each canonical column the highest-priority alias present wins; any
/// other alias columns keep their names and are ignored.
pub fn normalize_resource_headers(headers: &StringRecord) -> StringRecord {
    let mut names: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    for (canonical, aliases) in [("youtube", YOUTUBE_HEADERS), ("docs", DOCS_HEADERS)] {
        let chosen = aliases
            .iter()
            .find_map(|alias| names.iter().position(|n| n == alias));
        if let Some(index) = chosen {
            names[index] = canonical.to_string();
        }
    }

    StringRecord::from(names)
}
