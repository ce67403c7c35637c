#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ptsb_sorter::core::config::SorterConfig;
use ptsb_sorter::core::domain::{BondLengths, BondPair, Frame};
use ptsb_sorter::core::error::{SortError, SortResult};
use ptsb_sorter::engine::evaluator::Evaluator;

/// Six atoms; pairs (1,2), (3,4), (5,6) sit `d[k]` apart along x.
pub const ATOMS: usize = 6;

pub fn frame(step: usize, flag: &str, d: [f64; 3]) -> String {
    let mut s = format!("{}\n", ATOMS);
    s.push_str(&format!("step {} t {}.0 E -1.5 {}\n", step, step, flag));
    for (k, dist) in d.iter().enumerate() {
        let y = 10.0 * k as f64;
        s.push_str(&format!("C 0.0000 {:.4} 0.0000\n", y));
        s.push_str(&format!("H {:.4} {:.4} 0.0000\n", dist, y));
    }
    s
}

/// Builds a trajectory from `(flag, bond lengths)` per frame.
pub fn trajectory(frames: &[(&str, [f64; 3])]) -> String {
    frames
        .iter()
        .enumerate()
        .map(|(i, (flag, d))| frame(i, flag, *d))
        .collect()
}

pub fn config(root: &Path) -> SorterConfig {
    SorterConfig {
        input_dir: Some(root.join("input")),
        output_root: root.join("out"),
        bonds: vec![BondPair::new(1, 2), BondPair::new(3, 4), BondPair::new(5, 6)],
        threads: 2,
        ..Default::default()
    }
}

pub fn write_input(root: &Path, name: &str, text: &str) -> PathBuf {
    let dir = root.join("input");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Reads bond lengths straight from metadata tokens 2..5 instead of geometry.
pub struct MockEvaluator;

impl Evaluator for MockEvaluator {
    fn evaluate(&self, frame: &Frame, _atom_count: usize) -> SortResult<BondLengths> {
        let meta = &frame.lines()[1];
        let lengths = meta
            .split_whitespace()
            .skip(1)
            .take(3)
            .map(|t| t.parse::<f64>().map_err(|_| SortError::format(frame.first_line + 1, t)))
            .collect::<SortResult<Vec<_>>>()?;
        Ok(BondLengths(lengths))
    }

    fn name(&self) -> &str {
        "Mock Evaluator"
    }
}
