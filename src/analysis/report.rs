use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::SorterConfig;
use crate::core::domain::OutcomeCategory;
use crate::core::error::{SortError, SortResult};
use crate::pipeline::SortEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Classified,
    Failed,
}

/// One input file's fate. Maps the numbered output back to its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub input: PathBuf,
    pub status: EntryStatus,
    pub category: Option<OutcomeCategory>,
    pub reverse_first: Option<bool>,
    pub output: Option<PathBuf>,
    pub before_frames: Option<usize>,
    pub after_frames: Option<usize>,
    pub before_bonds: Vec<f64>,
    pub after_bonds: Vec<f64>,
    pub error: Option<String>,
}

/// Flat row for CSV; the csv writer cannot nest sequences.
#[derive(Debug, Serialize)]
struct ManifestRow<'a> {
    index: usize,
    input: String,
    status: EntryStatus,
    category: Option<&'static str>,
    reverse_first: Option<bool>,
    output: Option<String>,
    before_frames: Option<usize>,
    after_frames: Option<usize>,
    before_bonds: String,
    after_bonds: String,
    error: Option<&'a str>,
}

fn join_bonds(bonds: &[f64]) -> String {
    bonds
        .iter()
        .map(|b| format!("{:.6}", b))
        .collect::<Vec<_>>()
        .join(";")
}

impl<'a> From<&'a ManifestEntry> for ManifestRow<'a> {
    fn from(e: &'a ManifestEntry) -> Self {
        Self {
            index: e.index,
            input: e.input.display().to_string(),
            status: e.status,
            category: e.category.map(|c| c.key()),
            reverse_first: e.reverse_first,
            output: e.output.as_ref().map(|p| p.display().to_string()),
            before_frames: e.before_frames,
            after_frames: e.after_frames,
            before_bonds: join_bonds(&e.before_bonds),
            after_bonds: join_bonds(&e.after_bonds),
            error: e.error.as_deref(),
        }
    }
}

/// Record of a whole sorting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config: SorterConfig,
    pub entries: Vec<ManifestEntry>,
}

impl RunReport {
    pub fn new(config: &SorterConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            config: config.clone(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, event: &SortEvent) {
        match event {
            SortEvent::Classified(o) => self.entries.push(ManifestEntry {
                index: o.index,
                input: o.input.clone(),
                status: EntryStatus::Classified,
                category: Some(o.classification.category),
                reverse_first: Some(o.classification.reverse_first),
                output: Some(o.output.clone()),
                before_frames: Some(o.before_frames),
                after_frames: Some(o.after_frames),
                before_bonds: o.before_bonds.as_slice().to_vec(),
                after_bonds: o.after_bonds.as_slice().to_vec(),
                error: None,
            }),
            SortEvent::Failed { index, failure } => self.entries.push(ManifestEntry {
                index: *index,
                input: failure.path.clone(),
                status: EntryStatus::Failed,
                category: None,
                reverse_first: None,
                output: None,
                before_frames: None,
                after_frames: None,
                before_bonds: Vec::new(),
                after_bonds: Vec::new(),
                error: Some(failure.error.to_string()),
            }),
            SortEvent::Finished => self.finish(),
            SortEvent::Started(_) => {}
        }
    }

    /// Stamps the end time and restores input order (workers finish out of order).
    pub fn finish(&mut self) {
        self.entries.sort_by_key(|e| e.index);
        self.finished_at = Some(Utc::now());
    }

    /// Writes CSV when the path ends in `.csv`, pretty JSON otherwise.
    pub fn write(&self, path: &Path) -> SortResult<()> {
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            self.write_csv(path)
        } else {
            self.write_json(path)
        }
    }

    pub fn write_json(&self, path: &Path) -> SortResult<()> {
        let out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(out, self)
            .map_err(|e| SortError::Io(e.into()))
    }

    pub fn write_csv(&self, path: &Path) -> SortResult<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| SortError::Io(e.into()))?;
        for entry in &self.entries {
            writer
                .serialize(ManifestRow::from(entry))
                .map_err(|e| SortError::Io(e.into()))?;
        }
        writer.flush()?;
        Ok(())
    }
}
