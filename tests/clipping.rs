#![allow(clippy::unwrap_used)]

use std::sync::Once;

use approx::assert_relative_eq;
use sweepclip::math::polygon_2d::signed_area_2d;
use sweepclip::{ClipError, Clipper, ClipperOptions, NodeId, Point2, PolyTree, PolyType};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    });
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
    vec![
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}

fn area(tree: &PolyTree, id: NodeId) -> f64 {
    signed_area_2d(tree.node(id).unwrap().contour())
}

/// Net area of all closed contours; holes count negative.
fn net_area(tree: &PolyTree) -> f64 {
    tree.iter()
        .filter(|(_, node)| !node.is_open())
        .map(|(_, node)| signed_area_2d(node.contour()))
        .sum()
}

#[test]
fn reversed_inner_square_becomes_hole() {
    init_tracing();
    let mut clipper = Clipper::new();
    let mut inner = rect(2.0, 2.0, 8.0, 8.0);
    inner.reverse();
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Subject));
    assert!(clipper.add_path(&inner, PolyType::Subject));

    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 1);
    let outer = tree.roots()[0];
    assert!(!tree.is_hole(outer));
    assert_relative_eq!(area(&tree, outer), 100.0, epsilon = 1e-9);

    let children = tree.node(outer).unwrap().children();
    assert_eq!(children.len(), 1);
    let hole = children[0];
    assert!(tree.is_hole(hole));
    assert_eq!(tree.node(hole).unwrap().parent(), Some(outer));
    assert_relative_eq!(area(&tree, hole), -36.0, epsilon = 1e-9);
}

#[test]
fn figure_eight_splits_into_two_outers() {
    init_tracing();
    let mut clipper = Clipper::new();
    let bowtie = [
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(10.0, 0.0),
        Point2::new(0.0, 10.0),
    ];
    assert!(clipper.add_path(&bowtie, PolyType::Subject));

    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 2);
    let points: usize = tree.iter().map(|(_, n)| n.contour().len()).sum();
    assert!(points <= bowtie.len() + 2);
    for &root in tree.roots() {
        assert!(!tree.is_hole(root));
        assert!(tree.node(root).unwrap().children().is_empty());
        assert_relative_eq!(area(&tree, root), 25.0, epsilon = 1e-9);
    }
}

#[test]
fn disjoint_squares_are_separate_roots() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_paths(
        &[rect(0.0, 0.0, 4.0, 4.0), rect(10.0, 0.0, 14.0, 4.0)],
        PolyType::Subject
    ));
    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 2);
    assert_eq!(tree.total_contours(), 2);
    assert_relative_eq!(net_area(&tree), 32.0, epsilon = 1e-9);
}

#[test]
fn degenerate_paths_are_rejected() {
    init_tracing();
    let mut clipper = Clipper::new();
    let p = Point2::new;
    assert!(!clipper.add_path(&[], PolyType::Subject));
    assert!(!clipper.add_path(&[p(1.0, 1.0)], PolyType::Subject));
    assert!(!clipper.add_path(&[p(0.0, 0.0), p(3.0, 3.0)], PolyType::Clip));
    assert!(!clipper.add_path(
        &[p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0), p(0.0, 0.0)],
        PolyType::Subject
    ));
    // Every vertex on one scanline.
    assert!(!clipper.add_path(&[p(0.0, 5.0), p(4.0, 5.0), p(9.0, 5.0)], PolyType::Subject));
    assert!(!clipper.add_open_path(&[p(2.0, 2.0), p(2.0, 2.0)]));

    assert!(clipper.execute().is_none());
    assert_eq!(clipper.try_execute().unwrap_err(), ClipError::NothingToClip);
}

#[test]
fn difference_of_overlapping_squares() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Subject));
    assert!(clipper.add_path(&rect(5.0, 5.0, 15.0, 15.0), PolyType::Clip));

    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 1);
    let root = tree.roots()[0];
    assert!(tree.node(root).unwrap().children().is_empty());
    assert_relative_eq!(area(&tree, root), 75.0, epsilon = 1e-9);
    let contour = tree.node(root).unwrap().contour();
    for corner in [Point2::new(10.0, 5.0), Point2::new(5.0, 5.0), Point2::new(5.0, 10.0)] {
        assert!(contour.contains(&corner), "missing corner {corner:?}");
    }
}

#[test]
fn clip_inside_subject_cuts_a_hole() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Subject));
    assert!(clipper.add_path(&rect(2.0, 2.0, 8.0, 8.0), PolyType::Clip));

    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 1);
    let outer = tree.roots()[0];
    let children = tree.node(outer).unwrap().children();
    assert_eq!(children.len(), 1);
    assert!(tree.is_hole(children[0]));
    assert_relative_eq!(net_area(&tree), 64.0, epsilon = 1e-9);
}

#[test]
fn clip_covering_subject_leaves_nothing() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_path(&rect(2.0, 2.0, 4.0, 4.0), PolyType::Subject));
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Clip));

    let tree = clipper.execute().unwrap();
    assert!(tree.is_empty());
    assert!(tree.roots().is_empty());
}

#[test]
fn open_path_keeps_parts_outside_clip() {
    init_tracing();
    let mut clipper = Clipper::new();
    let line = [Point2::new(-5.0, 0.0), Point2::new(15.0, 10.0)];
    assert!(clipper.add_open_path(&line));
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Clip));

    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 2);
    for &root in tree.roots() {
        let node = tree.node(root).unwrap();
        assert!(node.is_open());
        assert!(!tree.is_hole(root));
        assert_eq!(node.contour().len(), 2);
        for pt in node.contour() {
            assert!(pt.x <= 1e-9 || pt.x >= 10.0 - 1e-9, "{pt:?} lies inside the clip");
        }
    }
}

#[test]
fn rerunning_an_engine_is_deterministic() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Subject));
    assert!(clipper.add_path(&rect(3.0, -2.0, 6.0, 12.0), PolyType::Clip));

    let first = clipper.execute().unwrap();
    let second = clipper.execute().unwrap();
    assert_eq!(first.total_contours(), 2);
    assert_eq!(first.total_contours(), second.total_contours());
    for ((_, a), (_, b)) in first.iter().zip(second.iter()) {
        assert_eq!(a.contour(), b.contour());
    }
    assert_relative_eq!(net_area(&first), 70.0, epsilon = 1e-9);
}

#[test]
fn reverse_solution_flips_orientation() {
    init_tracing();
    let mut clipper = Clipper::with_options(ClipperOptions {
        reverse_solution: true,
        ..ClipperOptions::default()
    });
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Subject));
    let tree = clipper.execute().unwrap();
    assert_eq!(tree.roots().len(), 1);
    assert_relative_eq!(area(&tree, tree.roots()[0]), -100.0, epsilon = 1e-9);
}

#[test]
fn non_simple_output_when_strict_mode_is_off() {
    init_tracing();
    let mut clipper = Clipper::with_options(ClipperOptions {
        strictly_simple: false,
        ..ClipperOptions::default()
    });
    // Two squares sharing a single corner.
    assert!(clipper.add_path(&rect(0.0, 0.0, 5.0, 5.0), PolyType::Subject));
    assert!(clipper.add_path(&rect(5.0, 5.0, 10.0, 10.0), PolyType::Subject));
    let tree = clipper.execute().unwrap();
    assert!(!tree.is_empty());
    assert_relative_eq!(net_area(&tree), 50.0, epsilon = 1e-9);
}

#[test]
fn overlapping_subjects_drop_the_doubly_covered_region() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_path(&rect(0.0, 0.0, 10.0, 10.0), PolyType::Subject));
    assert!(clipper.add_path(&rect(5.0, 5.0, 15.0, 15.0), PolyType::Subject));

    let tree = clipper.execute().unwrap();
    assert_eq!(tree.total_contours(), 2);
    assert_relative_eq!(net_area(&tree), 150.0, epsilon = 1e-9);
}

#[test]
fn doubly_clipped_region_is_kept() {
    init_tracing();
    let mut clipper = Clipper::new();
    assert!(clipper.add_path(&rect(0.0, 0.0, 20.0, 20.0), PolyType::Subject));
    assert!(clipper.add_paths(
        &[rect(2.0, 2.0, 12.0, 12.0), rect(8.0, 8.0, 18.0, 18.0)],
        PolyType::Clip
    ));

    let tree = clipper.execute().unwrap();
    // 400 minus the 168 covered by exactly one clip.
    assert_relative_eq!(net_area(&tree), 232.0, epsilon = 1e-9);
}
