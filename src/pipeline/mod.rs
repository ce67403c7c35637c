use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::domain::{BondLengths, Classification, OutcomeCategory};
use crate::core::error::FileFailure;

pub mod sorter;

/// What happened to one successfully classified input file.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// 1-based position in the sorted input listing.
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    pub classification: Classification,
    pub before_frames: usize,
    pub after_frames: usize,
    pub before_bonds: BondLengths,
    pub after_bonds: BondLengths,
}

/// Events emitted by the sorter to the driving thread.
#[derive(Debug)]
pub enum SortEvent {
    /// Input listing is known; carries the number of files queued.
    Started(usize),

    Classified(Outcome),

    /// The file was skipped; the run carries on.
    Failed { index: usize, failure: FileFailure },

    /// All files have been handled.
    Finished,
}

/// Running tally over a batch.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub queued: usize,
    pub classified: usize,
    pub failed: usize,
    pub per_category: BTreeMap<&'static str, usize>,
}

impl RunStats {
    pub fn new() -> Self {
        let per_category = OutcomeCategory::ALL.iter().map(|c| (c.key(), 0)).collect();
        Self {
            per_category,
            ..Default::default()
        }
    }

    pub fn ingest(&mut self, event: &SortEvent) {
        match event {
            SortEvent::Started(n) => self.queued = *n,
            SortEvent::Classified(outcome) => {
                self.classified += 1;
                *self
                    .per_category
                    .entry(outcome.classification.category.key())
                    .or_insert(0) += 1;
            }
            SortEvent::Failed { .. } => self.failed += 1,
            SortEvent::Finished => {}
        }
    }

    pub fn count(&self, category: OutcomeCategory) -> usize {
        self.per_category.get(category.key()).copied().unwrap_or(0)
    }

    pub fn processed(&self) -> usize {
        self.classified + self.failed
    }

    /// One-line summary, e.g. `r2r=3 r2p1=1 r2p2=0 p2p=2 failed=1`.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = OutcomeCategory::ALL
            .iter()
            .map(|c| format!("{}={}", c.key(), self.count(*c)))
            .collect();
        parts.push(format!("failed={}", self.failed));
        parts.join(" ")
    }
}
