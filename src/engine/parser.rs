use crate::core::domain::{Frame, Trajectory, FRAME_HEADER_LINES};
use crate::core::error::{SortError, SortResult};

/// Reads the atom count from the first line of a trajectory.
pub fn read_atom_count(first_line: &str) -> SortResult<usize> {
    let trimmed = first_line.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(SortError::format(1, "atom count must be positive")),
        Err(_) => Err(SortError::format(
            1,
            format!("expected an atom count, found '{}'", trimmed),
        )),
    }
}

/// Cursor over fixed-size frame records.
///
/// Every record is `atom_count + 2` lines, starting at line 0. The count line
/// of later records is carried along but not re-checked. Lines keep their
/// terminators; only a final line without one gets `\n` appended.
pub struct FrameReader<'a> {
    lines: Vec<&'a str>,
    frame_size: usize,
    cursor: usize,
    allow_truncated: bool,
}

impl<'a> FrameReader<'a> {
    pub fn new(text: &'a str, allow_truncated: bool) -> SortResult<Self> {
        let mut lines: Vec<&str> = text.split_inclusive('\n').collect();

        // Blank tail lines are editor noise, not a partial record.
        while lines.last().map_or(false, |l| l.trim().is_empty()) {
            lines.pop();
        }

        let first = lines
            .first()
            .ok_or_else(|| SortError::format(1, "file is empty"))?;
        let atom_count = read_atom_count(first)?;
        let frame_size = atom_count
            .checked_add(FRAME_HEADER_LINES)
            .ok_or_else(|| {
                SortError::format(1, format!("atom count {} is too large", atom_count))
            })?;

        Ok(Self {
            lines,
            frame_size,
            cursor: 0,
            allow_truncated,
        })
    }

    pub fn atom_count(&self) -> usize {
        self.frame_size - FRAME_HEADER_LINES
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = SortResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.lines.len() {
            return None;
        }

        let start = self.cursor;
        let end = (start + self.frame_size).min(self.lines.len());
        self.cursor = end;

        let short = end - start < self.frame_size;
        if short && !self.allow_truncated {
            // Stop after reporting; a partial record has no successor.
            self.cursor = self.lines.len();
            return Some(Err(SortError::format(
                start + 1,
                format!(
                    "trailing frame has {} of {} lines",
                    end - start,
                    self.frame_size
                ),
            )));
        }

        // An unterminated last line of the file gets a newline so the frame
        // can be written anywhere in the output.
        let block = self.lines[start..end]
            .iter()
            .map(|l| {
                if l.ends_with('\n') {
                    l.to_string()
                } else {
                    format!("{}\n", l)
                }
            })
            .collect();
        Some(Ok(Frame::new(start + 1, block)))
    }
}

/// Parses a whole trajectory into memory.
pub fn parse_trajectory(text: &str, allow_truncated: bool) -> SortResult<Trajectory> {
    let reader = FrameReader::new(text, allow_truncated)?;
    let atom_count = reader.atom_count();
    let frames = reader.collect::<SortResult<Vec<_>>>()?;
    Ok(Trajectory { atom_count, frames })
}
