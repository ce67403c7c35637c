use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::domain::{Frame, SplitTrajectory};
use crate::core::error::SortResult;

pub fn output_file_name(index: usize) -> String {
    format!("traj{}.xyz", index)
}

/// Output frame order: the leading segment runs backwards in time, the other
/// follows in its original order.
///
/// `reverse_first == true` leads with the pre-division segment, otherwise with
/// the post-division one.
pub fn ordered_frames(
    split: &SplitTrajectory,
    reverse_first: bool,
) -> impl Iterator<Item = &Frame> + '_ {
    let (lead, tail) = if reverse_first {
        (&split.before, &split.after)
    } else {
        (&split.after, &split.before)
    };
    lead.frames().iter().rev().chain(tail.frames().iter())
}

/// Writes the joined frames to `<dir>/traj<index>.xyz`, replacing any
/// existing file. Frames go out exactly as they were read.
pub fn write_trajectory(
    dir: &Path,
    index: usize,
    split: &SplitTrajectory,
    reverse_first: bool,
) -> SortResult<PathBuf> {
    let path = dir.join(output_file_name(index));
    let file = File::create(&path)?;
    let mut out = BufWriter::new(file);

    for frame in ordered_frames(split, reverse_first) {
        frame.write_to(&mut out)?;
    }
    out.flush()?;

    Ok(path)
}
