use std::fs;
use std::path::Path;
use std::sync::Arc;

use ptsb_sorter::core::domain::OutcomeCategory;
use ptsb_sorter::core::error::SortError;
use ptsb_sorter::engine::parser::parse_trajectory;
use ptsb_sorter::pipeline::sorter::Sorter;
use tempfile::TempDir;

use crate::common::{config, frame, trajectory, MockEvaluator};

mod common;

fn sort(root: &Path, index: usize, text: &str) -> ptsb_sorter::pipeline::Outcome {
    let sorter = Sorter::new(config(root));
    sorter.prepare_output_dirs().unwrap();
    sorter
        .sort_text(index, &root.join("input.xyz"), text)
        .expect("trajectory should sort")
}

#[test]
fn test_recrossing_goes_to_r2r() {
    let tmp = TempDir::new().unwrap();
    let frames = [
        ("0", [2.0, 2.0, 2.0]),
        ("0", [4.0, 2.0, 2.0]),
        ("1", [2.5, 2.0, 2.0]),
        ("0", [4.5, 2.0, 2.0]),
    ];
    let outcome = sort(tmp.path(), 1, &trajectory(&frames));

    assert_eq!(outcome.classification.category, OutcomeCategory::RecrossReactant);
    assert!(outcome.classification.reverse_first);
    assert_eq!(outcome.output, tmp.path().join("out/r2r/traj1.xyz"));
    assert_eq!((outcome.before_frames, outcome.after_frames), (2, 2));

    // Pre-division frames reversed, then post-division frames as they were.
    let expected = [
        frame(1, "0", frames[1].1),
        frame(0, "0", frames[0].1),
        frame(2, "1", frames[2].1),
        frame(3, "0", frames[3].1),
    ]
    .concat();
    assert_eq!(fs::read_to_string(&outcome.output).unwrap(), expected);
}

#[test]
fn test_forming_bond2_goes_to_r2p1() {
    let tmp = TempDir::new().unwrap();
    let frames = [
        ("0", [4.0, 2.0, 2.0]),
        ("1", [2.0, 2.0, 2.0]),
        ("0", [2.0, 1.2, 2.0]),
    ];
    let outcome = sort(tmp.path(), 2, &trajectory(&frames));

    assert_eq!(outcome.classification.category, OutcomeCategory::ProductChannel1);
    assert!(outcome.classification.reverse_first);
    assert_eq!(outcome.output, tmp.path().join("out/r2p1/traj2.xyz"));
    let expected = [
        frame(0, "0", frames[0].1),
        frame(1, "1", frames[1].1),
        frame(2, "0", frames[2].1),
    ]
    .concat();
    assert_eq!(fs::read_to_string(&outcome.output).unwrap(), expected);
}

#[test]
fn test_product_side_first_reverses_post_division() {
    let tmp = TempDir::new().unwrap();
    let frames = [
        ("0", [2.0, 2.0, 2.0]),
        ("0", [2.0, 2.0, 1.1]),
        ("1", [2.0, 2.0, 2.0]),
        ("0", [3.9, 2.0, 2.0]),
    ];
    let outcome = sort(tmp.path(), 3, &trajectory(&frames));

    assert_eq!(outcome.classification.category, OutcomeCategory::ProductChannel2);
    assert!(!outcome.classification.reverse_first);
    let expected = [
        frame(3, "0", frames[3].1),
        frame(2, "1", frames[2].1),
        frame(0, "0", frames[0].1),
        frame(1, "0", frames[1].1),
    ]
    .concat();
    assert_eq!(fs::read_to_string(&outcome.output).unwrap(), expected);
}

#[test]
fn test_unmatched_goes_to_p2p() {
    let tmp = TempDir::new().unwrap();
    let frames = [("0", [2.0; 3]), ("1", [2.0; 3]), ("1", [2.0; 3])];
    let outcome = sort(tmp.path(), 4, &trajectory(&frames));

    assert_eq!(outcome.classification.category, OutcomeCategory::Generic);
    assert!(outcome.classification.reverse_first);
    assert_eq!(outcome.output, tmp.path().join("out/p2p/traj4.xyz"));
}

#[test]
fn test_round_trip_restores_original_order() {
    let tmp = TempDir::new().unwrap();
    let frames = [
        ("0", [2.0, 1.0, 2.0]),
        ("0", [2.2, 1.3, 2.0]),
        ("0", [2.4, 1.5, 2.0]),
        ("1", [3.0, 2.0, 2.0]),
        ("0", [3.6, 2.4, 2.0]),
    ];
    let original = trajectory(&frames);
    let outcome = sort(tmp.path(), 5, &original);
    assert!(!outcome.classification.reverse_first);

    let written = parse_trajectory(&fs::read_to_string(&outcome.output).unwrap(), false).unwrap();
    let lead = if outcome.classification.reverse_first {
        outcome.before_frames
    } else {
        outcome.after_frames
    };

    let mut head: Vec<String> = written.frames[..lead].iter().rev().map(|f| f.lines().concat()).collect();
    let tail: Vec<String> = written.frames[lead..].iter().map(|f| f.lines().concat()).collect();
    let restored = if outcome.classification.reverse_first {
        head.extend(tail);
        head
    } else {
        let mut v = tail;
        v.extend(head);
        v
    };
    assert_eq!(restored.concat(), original);
}

#[test]
fn test_unterminated_last_line_keeps_frames_apart() {
    let tmp = TempDir::new().unwrap();
    let d = [
        [2.0, 1.0, 2.0],
        [2.2, 1.3, 2.0],
        [2.4, 1.5, 2.0],
        [3.0, 2.0, 2.0],
        [3.6, 2.4, 2.0],
    ];
    let flags = ["0", "0", "0", "1", "0"];
    let frames: Vec<String> = (0..5).map(|i| frame(i, flags[i], d[i])).collect();
    let text = frames.concat();

    // The last input frame leads the output, so its final line must be closed.
    let outcome = sort(tmp.path(), 6, text.trim_end_matches('\n'));
    assert_eq!(outcome.classification.category, OutcomeCategory::ProductChannel1);
    assert!(!outcome.classification.reverse_first);

    let expected = [&frames[4], &frames[3], &frames[0], &frames[1], &frames[2]];
    let written = fs::read_to_string(&outcome.output).unwrap();
    assert_eq!(written, expected.map(|s| s.as_str()).concat());
    assert_eq!(parse_trajectory(&written, false).unwrap().frames.len(), 5);
}

#[test]
fn test_existing_output_is_overwritten() {
    let tmp = TempDir::new().unwrap();
    let first = sort(tmp.path(), 1, &trajectory(&[("0", [2.0; 3]), ("1", [2.0; 3])]));
    let text = trajectory(&[("0", [2.1; 3]), ("1", [2.1; 3])]);
    let second = sort(tmp.path(), 1, &text);

    assert_eq!(first.output, second.output);
    assert_eq!(fs::read_to_string(&second.output).unwrap(), text);
}

#[test]
fn test_missing_division_is_empty_segment() {
    let tmp = TempDir::new().unwrap();
    let sorter = Sorter::new(config(tmp.path()));
    let text = trajectory(&[("0", [4.0; 3]), ("0", [4.0; 3])]);

    let err = sorter.sort_text(1, Path::new("x.xyz"), &text).unwrap_err();
    assert!(matches!(err, SortError::EmptySegment(_)));
}

#[test]
fn test_bond_past_atom_count_is_config_mismatch() {
    let tmp = TempDir::new().unwrap();
    let mut cfg = config(tmp.path());
    cfg.bonds[2].second = 7;
    let sorter = Sorter::new(cfg);

    let text = trajectory(&[("0", [4.0; 3]), ("1", [4.0; 3])]);
    let err = sorter.sort_text(1, Path::new("x.xyz"), &text).unwrap_err();
    assert!(matches!(err, SortError::ConfigMismatch(_)));
}

#[test]
fn test_truncated_tail_policy() {
    let tmp = TempDir::new().unwrap();
    let text = trajectory(&[("0", [4.0; 3]), ("1", [4.5; 3])]) + "6\nstep 2 t 2.0 E -1.5 0\nC 0 0 0\n";

    let strict = Sorter::new(config(tmp.path()));
    assert!(matches!(
        strict.sort_text(1, Path::new("x.xyz"), &text),
        Err(SortError::Format { line: 17, .. })
    ));

    // Kept as a frame, then rejected when its atoms are read.
    let mut cfg = config(tmp.path());
    cfg.allow_truncated = true;
    let lenient = Sorter::new(cfg);
    assert!(matches!(
        lenient.sort_text(1, Path::new("x.xyz"), &text),
        Err(SortError::Format { line: 17, .. })
    ));
}

#[test]
fn test_custom_evaluator() {
    let tmp = TempDir::new().unwrap();
    let sorter = Sorter::with_evaluator(config(tmp.path()), Arc::new(MockEvaluator));
    sorter.prepare_output_dirs().unwrap();

    let text = "1\nm 4.0 2.0 2.0 x x 0\nX 0 0 0\n1\nm 2.0 2.0 1.0 x x 1\nX 0 0 0\n";
    let outcome = sorter.sort_text(9, Path::new("mock.xyz"), text).unwrap();
    assert_eq!(outcome.classification.category, OutcomeCategory::ProductChannel2);
    assert_eq!(outcome.before_bonds.as_slice(), &[4.0, 2.0, 2.0]);
}
