use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::domain::{BondPair, OutcomeCategory};
use crate::core::error::{SortError, SortResult};

/// Bond pairs the built-in rule set refers to positionally.
pub const CLASSIFIER_BOND_COUNT: usize = 3;

/// Directory name per outcome bucket, relative to the output root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDirs {
    pub r2r: String,
    pub r2p1: String,
    pub r2p2: String,
    pub p2p: String,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self {
            r2r: OutcomeCategory::RecrossReactant.key().to_string(),
            r2p1: OutcomeCategory::ProductChannel1.key().to_string(),
            r2p2: OutcomeCategory::ProductChannel2.key().to_string(),
            p2p: OutcomeCategory::Generic.key().to_string(),
        }
    }
}

impl OutputDirs {
    pub fn name_for(&self, category: OutcomeCategory) -> &str {
        match category {
            OutcomeCategory::RecrossReactant => &self.r2r,
            OutcomeCategory::ProductChannel1 => &self.r2p1,
            OutcomeCategory::ProductChannel2 => &self.r2p2,
            OutcomeCategory::Generic => &self.p2p,
        }
    }
}

/// Everything a sorting run can be tuned with. Passed by reference into each
/// component instead of living in globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// Reaction name; doubles as the input folder when `input_dir` is unset.
    pub reaction: String,
    pub input_dir: Option<PathBuf>,
    /// Regex matched against input file names.
    pub file_pattern: String,

    // Geometry
    pub bonds: Vec<BondPair>,
    pub break_threshold: f64,     // Å
    pub formation_threshold: f64, // Å

    // Output
    pub output_root: PathBuf,
    pub output_dirs: OutputDirs,

    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    /// Emit a short trailing record as a frame instead of rejecting the file.
    pub allow_truncated: bool,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            reaction: "spnf".to_string(),
            input_dir: None,
            file_pattern: r"\.xyz$".to_string(),
            bonds: vec![
                BondPair::new(16, 62),
                BondPair::new(15, 56),
                BondPair::new(13, 41),
            ],
            break_threshold: 3.2,
            formation_threshold: 1.7,
            output_root: PathBuf::from("."),
            output_dirs: OutputDirs::default(),
            threads: 0,
            allow_truncated: false,
        }
    }
}

impl SorterConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn load(path: &Path) -> SortResult<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| SortError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_json(&self) -> SortResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SortError::Config(e.to_string()))
    }

    pub fn input_dir(&self) -> PathBuf {
        self.input_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.reaction))
    }

    pub fn output_dir(&self, category: OutcomeCategory) -> PathBuf {
        self.output_root.join(self.output_dirs.name_for(category))
    }

    pub fn file_regex(&self) -> SortResult<Regex> {
        Regex::new(&self.file_pattern)
            .map_err(|e| SortError::Config(format!("bad file pattern: {}", e)))
    }

    pub fn validate(&self) -> SortResult<()> {
        if self.bonds.len() != CLASSIFIER_BOND_COUNT {
            return Err(SortError::Config(format!(
                "the outcome rules need exactly {} bond pairs, got {}",
                CLASSIFIER_BOND_COUNT,
                self.bonds.len()
            )));
        }
        if let Some(bad) = self.bonds.iter().find(|b| b.indices().is_none()) {
            return Err(SortError::Config(format!(
                "bond pair {} uses index 0; atom indices are 1-based",
                bad
            )));
        }
        // Also rejects NaN.
        if !(self.break_threshold > 0.0) || !(self.formation_threshold > 0.0) {
            return Err(SortError::Config(
                "thresholds must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in OutcomeCategory::ALL {
            let name = self.output_dirs.name_for(category);
            if name.trim().is_empty() {
                return Err(SortError::Config(format!(
                    "output directory for {} is empty",
                    category
                )));
            }
            if !seen.insert(name) {
                return Err(SortError::Config(format!(
                    "output directory '{}' is used by more than one category",
                    name
                )));
            }
        }

        self.file_regex()?;
        Ok(())
    }
}
