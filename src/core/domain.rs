use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::core::error::{SortError, SortResult};

// --- Constants ---

/// 0-based token position of the division flag on a frame's metadata line.
pub const DIVISION_TOKEN: usize = 6;
pub const DIVISION_MARK: &str = "1";

/// Header lines preceding the atom block of every frame (count + metadata).
pub const FRAME_HEADER_LINES: usize = 2;

// --- Trajectory Types ---

/// One timestep: the count line, the metadata line, then one line per atom.
///
/// Lines are stored verbatim, terminators included, so a frame can be
/// written back out byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 1-based line number of the count line within the source file.
    pub first_line: usize,
    lines: Vec<String>,
}

impl Frame {
    pub fn new(first_line: usize, lines: Vec<String>) -> Self {
        Self { first_line, lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines after the two header lines. Shorter than the atom count only
    /// for a truncated trailing frame.
    pub fn atom_lines(&self) -> &[String] {
        self.lines.get(FRAME_HEADER_LINES..).unwrap_or(&[])
    }

    /// The 7th whitespace token of the metadata line.
    pub fn division_flag(&self) -> SortResult<&str> {
        let line_no = self.first_line + 1;
        let meta = self
            .lines
            .get(1)
            .ok_or_else(|| SortError::format(line_no, "frame has no metadata line"))?;

        meta.split_whitespace().nth(DIVISION_TOKEN).ok_or_else(|| {
            SortError::format(
                line_no,
                format!(
                    "metadata line needs at least {} tokens, found {}",
                    DIVISION_TOKEN + 1,
                    meta.split_whitespace().count()
                ),
            )
        })
    }

    pub fn is_division(&self) -> SortResult<bool> {
        Ok(self.division_flag()? == DIVISION_MARK)
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in &self.lines {
            out.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

/// All frames of one input file. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub atom_count: usize,
    pub frames: Vec<Frame>,
}

/// A tracked atom pair, 1-based as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondPair {
    pub first: usize,
    pub second: usize,
}

impl BondPair {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    /// 0-based indices into a frame's coordinate list.
    /// `None` when either side was configured as 0.
    pub fn indices(&self) -> Option<(usize, usize)> {
        Some((self.first.checked_sub(1)?, self.second.checked_sub(1)?))
    }
}

impl std::fmt::Display for BondPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

impl std::str::FromStr for BondPair {
    type Err = String;

    /// Accepts `16-62`, `16,62` or `16:62`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(|c: char| c == '-' || c == ',' || c == ':');
        let (a, b) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => (a.trim(), b.trim()),
            _ => return Err(format!("expected a pair like 16-62, got '{}'", s)),
        };
        let first = a.parse().map_err(|_| format!("bad atom index '{}'", a))?;
        let second = b.parse().map_err(|_| format!("bad atom index '{}'", b))?;
        Ok(Self { first, second })
    }
}

/// One distance per configured bond pair, in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondLengths(pub Vec<f64>);

impl BondLengths {
    /// 0-based positional access.
    pub fn get(&self, bond: usize) -> Option<f64> {
        self.0.get(bond).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Frames on one side of the division point plus their bond lengths.
/// **Invariant**: `frames` and `bonds` are co-indexed and equally long.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    frames: Vec<Frame>,
    bonds: Vec<BondLengths>,
}

impl Segment {
    pub fn push(&mut self, frame: Frame, bonds: BondLengths) {
        self.frames.push(frame);
        self.bonds.push(bonds);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn bonds(&self) -> &[BondLengths] {
        &self.bonds
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_bonds(&self) -> Option<&BondLengths> {
        self.bonds.last()
    }
}

/// Which side of the division point a segment sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Before => "before division",
            Side::After => "after division",
        }
    }
}

/// A trajectory cut at its first division frame.
#[derive(Debug, Clone, Default)]
pub struct SplitTrajectory {
    pub before: Segment,
    pub after: Segment,
}

impl SplitTrajectory {
    /// Final bond lengths of both segments, the classifier's only input.
    pub fn terminal_bonds(&self) -> SortResult<(&BondLengths, &BondLengths)> {
        let before = self
            .before
            .last_bonds()
            .ok_or(SortError::EmptySegment(Side::Before.label()))?;
        let after = self
            .after
            .last_bonds()
            .ok_or(SortError::EmptySegment(Side::After.label()))?;
        Ok((before, after))
    }
}

// --- Outcome Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeCategory {
    /// Reactant back to reactant.
    RecrossReactant,
    ProductChannel1,
    ProductChannel2,
    /// Nothing else matched; filed as product to product.
    Generic,
}

impl OutcomeCategory {
    pub const ALL: [OutcomeCategory; 4] = [
        OutcomeCategory::RecrossReactant,
        OutcomeCategory::ProductChannel1,
        OutcomeCategory::ProductChannel2,
        OutcomeCategory::Generic,
    ];

    /// Short bucket key, also the default output directory name.
    pub fn key(&self) -> &'static str {
        match self {
            OutcomeCategory::RecrossReactant => "r2r",
            OutcomeCategory::ProductChannel1 => "r2p1",
            OutcomeCategory::ProductChannel2 => "r2p2",
            OutcomeCategory::Generic => "p2p",
        }
    }
}

impl std::fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Classifier verdict: where the trajectory goes and which segment leads,
/// reversed, in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: OutcomeCategory,
    pub reverse_first: bool,
}
