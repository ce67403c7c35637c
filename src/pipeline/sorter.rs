use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Sender;
use log::{debug, info};
use rayon::prelude::*;

use crate::core::config::SorterConfig;
use crate::core::domain::OutcomeCategory;
use crate::core::error::{FileFailure, SortError, SortResult};
use crate::engine::classifier::Classifier;
use crate::engine::evaluator::{BondEvaluator, Evaluator};
use crate::engine::{parser, splitter, writer};
use crate::pipeline::{Outcome, SortEvent};

/// Drives parse -> split -> classify -> write for a batch of files.
pub struct Sorter {
    config: SorterConfig,
    evaluator: Arc<dyn Evaluator>,
    classifier: Classifier,
}

impl Sorter {
    pub fn new(config: SorterConfig) -> Self {
        let evaluator: Arc<dyn Evaluator> = Arc::new(BondEvaluator::new(config.bonds.clone()));
        Self::with_evaluator(config, evaluator)
    }

    pub fn with_evaluator(config: SorterConfig, evaluator: Arc<dyn Evaluator>) -> Self {
        let classifier = Classifier::from_config(&config);
        Self {
            config,
            evaluator,
            classifier,
        }
    }

    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    /// Creates every bucket directory. Safe to call repeatedly.
    pub fn prepare_output_dirs(&self) -> SortResult<()> {
        for category in OutcomeCategory::ALL {
            let dir = self.config.output_dir(category);
            fs::create_dir_all(&dir)?;
            debug!("Output directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Input files matching the configured pattern, sorted by name so that
    /// numbering is stable between runs.
    pub fn discover_inputs(&self) -> SortResult<Vec<PathBuf>> {
        discover_inputs(&self.config.input_dir(), &self.config)
    }

    /// Classifies trajectory text and writes it into its bucket.
    pub fn sort_text(&self, index: usize, input: &Path, text: &str) -> SortResult<Outcome> {
        let trajectory = parser::parse_trajectory(text, self.config.allow_truncated)?;
        let split = splitter::split_trajectory(&trajectory, self.evaluator.as_ref())?;
        let (before_bonds, after_bonds) = split.terminal_bonds()?;

        let classification = self.classifier.classify(before_bonds, after_bonds);
        let dir = self.config.output_dir(classification.category);
        let output = writer::write_trajectory(&dir, index, &split, classification.reverse_first)?;

        Ok(Outcome {
            index,
            input: input.to_path_buf(),
            output,
            classification,
            before_frames: split.before.len(),
            after_frames: split.after.len(),
            before_bonds: before_bonds.clone(),
            after_bonds: after_bonds.clone(),
        })
    }

    pub fn sort_file(&self, index: usize, input: &Path) -> Result<Outcome, FileFailure> {
        fs::read_to_string(input)
            .map_err(SortError::from)
            .and_then(|text| self.sort_text(index, input, &text))
            .map_err(|error| FileFailure {
                path: input.to_path_buf(),
                error,
            })
    }

    /// Sorts `inputs` (numbered from 1 in the given order) on a rayon pool,
    /// reporting each file on `tx`. Per-file failures are reported, not
    /// returned; only pool construction can fail the call.
    ///
    /// Output directories must already exist (see `prepare_output_dirs`).
    pub fn run(&self, inputs: &[PathBuf], tx: Sender<SortEvent>) -> SortResult<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("sort-worker-{}", i))
            .build()
            .map_err(|e| SortError::Config(format!("thread pool: {}", e)))?;

        info!(
            "Sorting {} trajectories with {} ({} threads)",
            inputs.len(),
            self.evaluator.name(),
            pool.current_num_threads()
        );
        let _ = tx.send(SortEvent::Started(inputs.len()));

        pool.install(|| {
            inputs.par_iter().enumerate().for_each(|(i, path)| {
                let index = i + 1;
                let event = match self.sort_file(index, path) {
                    Ok(outcome) => SortEvent::Classified(outcome),
                    Err(failure) => SortEvent::Failed { index, failure },
                };
                let _ = tx.send(event);
            });
        });

        let _ = tx.send(SortEvent::Finished);
        Ok(())
    }
}

pub fn discover_inputs(dir: &Path, config: &SorterConfig) -> SortResult<Vec<PathBuf>> {
    let pattern = config.file_regex()?;
    let mut inputs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .map_or(false, |name| pattern.is_match(&name.to_string_lossy()));
        if matched {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}
