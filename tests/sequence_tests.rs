//! Integration tests for frame sequence collapsing

use pipeline_paths::{collapse, FrameSequence};
use pretty_assertions::assert_eq;

#[test]
fn test_unordered_frames() {
    let seq = collapse(&["render.0003.exr", "render.0001.exr", "render.0002.exr"]).unwrap();

    assert_eq!(seq.format_single(), "render.%04d.exr");
    assert_eq!(seq.to_string(), "render.%04d.exr [1-3]");
    assert_eq!((seq.frame_in(), seq.frame_out()), (1, 3));
    assert_eq!(seq.len(), 3);
}

#[test]
fn test_single_frame() {
    let seq = collapse(&["shot_v002.0007.exr"]).unwrap();

    assert_eq!(seq.format_single(), "shot_v002.%04d.exr");
    assert_eq!((seq.frame_in(), seq.frame_out()), (7, 7));

    let record = seq.record();
    assert_eq!(record.path, "shot_v002.%04d.exr");
    assert_eq!(record.collection_path, "shot_v002.%04d.exr [7]");
}

#[test]
fn test_gaps_are_kept() {
    let seq = collapse(&[
        "/mnt/plates/bg.1001.dpx",
        "/mnt/plates/bg.1002.dpx",
        "/mnt/plates/bg.1005.dpx",
    ])
    .unwrap();

    assert_eq!(seq.ranges(), "1001-1002, 1005");
    assert_eq!(seq.holes(), vec![1003, 1004]);
    assert_eq!(seq.padding(), 0);
    assert_eq!(seq.format_single(), "/mnt/plates/bg.%d.dpx");
}

#[test]
fn test_version_number_is_not_the_frame() {
    let seq = collapse(&["comp_v003_0010.png", "comp_v003_0011.png"]).unwrap();
    assert_eq!(seq.head(), "comp_v003_");
    assert_eq!(seq.tail(), ".png");
    assert_eq!(seq.padding(), 4);
}

#[test]
fn test_collection_pattern_input() {
    let seq = collapse(&["render.%04d.exr [1-3, 5]"]).unwrap();
    assert_eq!(seq.indexes().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
    assert_eq!(
        seq.paths().collect::<Vec<_>>(),
        vec![
            "render.0001.exr",
            "render.0002.exr",
            "render.0003.exr",
            "render.0005.exr",
        ]
    );

    let hashes: FrameSequence = "render.####.exr [10-11]".parse().unwrap();
    assert_eq!(hashes.format_single(), "render.%04d.exr");
    assert_eq!((hashes.frame_in(), hashes.frame_out()), (10, 11));
}

#[test]
fn test_paths_collapse_back() {
    let seq = collapse(&["plate.%03d.jpg [8-12]"]).unwrap();
    let paths: Vec<String> = seq.paths().collect();
    assert_eq!(collapse(&paths).unwrap(), seq);
}

#[test]
fn test_mismatched_paths_rejected() {
    assert!(collapse(&["a.0001.exr", "b.0002.exr"]).is_err());
    assert!(collapse(&["a.0001.exr", "a.01.exr"]).is_err());
    assert!(collapse(&["no_frames.exr"]).is_err());
    assert!(collapse(&[] as &[&str]).is_err());
}
