use crate::core::domain::{SplitTrajectory, Trajectory};
use crate::core::error::SortResult;
use crate::engine::evaluator::Evaluator;

/// Cuts a trajectory at its first division frame.
///
/// Frames before the first `"1"` flag go to `before`; that frame and every
/// later one go to `after`, whatever their own flag says. If no frame is
/// flagged, `after` stays empty.
pub fn split_trajectory(
    trajectory: &Trajectory,
    evaluator: &dyn Evaluator,
) -> SortResult<SplitTrajectory> {
    let mut split = SplitTrajectory::default();
    let mut division_found = false;

    for frame in &trajectory.frames {
        let flagged = frame.is_division()?;
        let bonds = evaluator.evaluate(frame, trajectory.atom_count)?;

        if !division_found && flagged {
            division_found = true;
        }

        if division_found {
            split.after.push(frame.clone(), bonds);
        } else {
            split.before.push(frame.clone(), bonds);
        }
    }

    Ok(split)
}
