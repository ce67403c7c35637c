use nalgebra::Point3;

use crate::core::domain::{BondLengths, BondPair, Frame};
use crate::core::error::{SortError, SortResult};
use crate::core::spatial;

/// Turns one frame into the bond lengths the classifier looks at.
/// Implementations must be Thread-Safe (Sync).
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, frame: &Frame, atom_count: usize) -> SortResult<BondLengths>;

    fn name(&self) -> &str;
}

/// Euclidean distances for a fixed list of atom pairs.
#[derive(Debug, Clone)]
pub struct BondEvaluator {
    pairs: Vec<BondPair>,
}

impl BondEvaluator {
    pub fn new(pairs: Vec<BondPair>) -> Self {
        Self { pairs }
    }

    /// Resolves every pair to 0-based indices, checking them against the atom count.
    fn resolve(&self, atom_count: usize) -> SortResult<Vec<(usize, usize)>> {
        self.pairs
            .iter()
            .map(|pair| match pair.indices() {
                Some((i, j)) if i < atom_count && j < atom_count => Ok((i, j)),
                _ => Err(SortError::ConfigMismatch(format!(
                    "pair {} is outside atoms 1..={}",
                    pair, atom_count
                ))),
            })
            .collect()
    }
}

/// Parses the atom block of a frame: a label, then x y z.
/// Columns after z are ignored.
pub fn parse_coordinates(frame: &Frame, atom_count: usize) -> SortResult<Vec<Point3<f64>>> {
    let atom_lines = frame.atom_lines();
    let header = frame.lines().len() - atom_lines.len();
    let first_atom_line = frame.first_line + header;

    if atom_lines.len() < atom_count {
        return Err(SortError::format(
            frame.first_line,
            format!(
                "frame has {} atom lines, expected {}",
                atom_lines.len(),
                atom_count
            ),
        ));
    }

    let mut coords = Vec::with_capacity(atom_count);
    for (offset, line) in atom_lines.iter().take(atom_count).enumerate() {
        let line_no = first_atom_line + offset;
        let values: Vec<&str> = line.split_whitespace().skip(1).take(3).collect();
        if values.len() < 3 {
            return Err(SortError::format(
                line_no,
                format!("expected a label and 3 coordinates, found '{}'", line.trim_end()),
            ));
        }

        let mut xyz = [0.0f64; 3];
        for (slot, token) in xyz.iter_mut().zip(&values) {
            *slot = token
                .parse()
                .map_err(|_| SortError::format(line_no, format!("bad coordinate '{}'", token)))?;
        }
        coords.push(Point3::new(xyz[0], xyz[1], xyz[2]));
    }
    Ok(coords)
}

impl Evaluator for BondEvaluator {
    fn name(&self) -> &str {
        "Euclidean bond lengths"
    }

    fn evaluate(&self, frame: &Frame, atom_count: usize) -> SortResult<BondLengths> {
        let pairs = self.resolve(atom_count)?;
        let coords = parse_coordinates(frame, atom_count)?;

        let lengths = pairs
            .into_iter()
            .map(|(i, j)| {
                spatial::pair_distance(&coords, i, j).ok_or_else(|| {
                    SortError::ConfigMismatch(format!(
                        "atoms {} and {} not both present",
                        i + 1,
                        j + 1
                    ))
                })
            })
            .collect::<SortResult<Vec<_>>>()?;

        Ok(BondLengths(lengths))
    }
}
