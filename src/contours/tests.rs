use super::*;
use std::collections::{BTreeSet, HashMap};

fn point(col: usize, row: usize, tangent: (f32, f32)) -> ContourPoint {
    ContourPoint {
        x: col as f32,
        y: row as f32,
        cosine: tangent.0,
        sine: tangent.1,
    }
}

fn map_with(width: usize, height: usize, pts: &[(usize, usize, (f32, f32))]) -> ContourMap {
    let mut map = ContourMap::new(width, height).unwrap();
    for &(col, row, tangent) in pts {
        map.insert(col, row, point(col, row, tangent)).unwrap();
    }
    map
}

fn active_set(map: &ContourMap) -> BTreeSet<usize> {
    (0..map.width() * map.height())
        .filter(|&m| map.is_active(m))
        .collect()
}

fn assert_index_matches_active(map: &ContourMap) {
    let indexed: BTreeSet<usize> = map.index().iter().copied().collect();
    assert_eq!(indexed.len(), map.index().len(), "index has duplicates");
    assert_eq!(indexed, active_set(map));
}

fn horizontal_line(row: usize, cols: std::ops::RangeInclusive<usize>) -> Vec<(usize, usize, (f32, f32))> {
    cols.map(|col| (col, row, (1.0, 0.0))).collect()
}

fn circle(cx: f32, cy: f32, radius: f32) -> Vec<(usize, usize, (f32, f32))> {
    (0..720)
        .map(|k| {
            let theta = k as f32 * std::f32::consts::PI / 360.0;
            let col = (cx + radius * theta.cos()).round() as usize;
            let row = (cy + radius * theta.sin()).round() as usize;
            (col, row, (-theta.sin(), theta.cos()))
        })
        .collect()
}

#[test]
fn new_map_starts_inactive() {
    let map = ContourMap::new(7, 5).unwrap();
    assert!(map.is_allocated());
    assert!(map.is_empty());
    assert!(active_set(&map).is_empty());
    assert_eq!(map.position(6, 4), Some(34));
    assert_eq!(map.position(7, 0), None);
}

#[test]
fn new_map_reports_allocation_failure() {
    let err = ContourMap::new(usize::MAX, 2).unwrap_err();
    assert_eq!(
        err,
        ContourError::Allocation {
            width: usize::MAX,
            height: 2
        }
    );
}

#[test]
fn insert_normalizes_sign_without_duplicating_index() {
    let mut map = ContourMap::new(8, 8).unwrap();
    let m = map.insert(3, 4, point(3, 4, (0.6, -0.8))).unwrap();
    map.insert(3, 4, point(3, 4, (0.0, -1.0))).unwrap();
    assert_eq!(map.index(), &[m]);
    let p = map.point(m).unwrap();
    assert_eq!((p.cosine, p.sine), (0.0, 1.0));
    assert!(map.insert(8, 0, point(8, 0, (1.0, 0.0))).is_none());
}

#[test]
fn insert_stores_unit_tangents_only() {
    let mut map = ContourMap::new(8, 8).unwrap();
    let m = map.insert(2, 2, point(2, 2, (3.0, 4.0))).unwrap();
    let p = map.point(m).unwrap();
    assert!((p.cosine * p.cosine + p.sine * p.sine - 1.0).abs() < 1e-6);
    assert!((p.cosine - 0.6).abs() < 1e-6 && (p.sine - 0.8).abs() < 1e-6);

    assert!(map.insert(5, 5, point(5, 5, (0.0, 0.0))).is_none());
    assert!(map.insert(5, 6, point(5, 6, (f32::NAN, 1.0))).is_none());
    assert_eq!(map.index(), &[m]);
    assert!(!map.is_active(5 * 8 + 5));
}

#[test]
fn release_is_idempotent_and_disables_cleaning() {
    let mut map = map_with(10, 10, &horizontal_line(5, 2..=7));
    map.release();
    map.release();
    assert!(!map.is_allocated());
    assert!(map.is_empty());
    let before = map.clone();
    assert!(map.clean(&CleanParams::new(1, 1, 0.5, 0)).is_none());
    assert_eq!(map, before);
    assert!(map.insert(1, 1, point(1, 1, (1.0, 0.0))).is_none());
}

#[test]
fn assign_from_overlays_listed_positions_only() {
    let mut target = map_with(8, 8, &[(1, 1, (1.0, 0.0))]);
    let mut source = map_with(8, 8, &[(2, 2, (1.0, 0.0)), (5, 6, (0.0, 1.0))]);
    let flipped = source.position(5, 6).unwrap();
    source.cosine[flipped] = 0.6;
    source.sine[flipped] = -0.8;

    target.assign_from(&source).unwrap();

    let kept = target.position(1, 1).unwrap();
    let copied = target.position(2, 2).unwrap();
    assert!(target.is_active(kept));
    assert!(target.is_active(copied));
    assert!(target.is_active(flipped));
    for &j in source.index() {
        assert!(target.sine[j] >= 0.0);
    }
    let p = target.point(flipped).unwrap();
    assert_eq!((p.cosine, p.sine), (-0.6, 0.8));
    assert_eq!((p.x, p.y), (5.0, 6.0));

    // The index is not merged by assignment.
    assert_eq!(target.index(), &[kept]);
    target.rebuild_index();
    assert_index_matches_active(&target);
    assert_eq!(target.len(), 3);
}

#[test]
fn assign_from_rejects_different_extent() {
    let mut target = ContourMap::new(8, 8).unwrap();
    let source = ContourMap::new(8, 9).unwrap();
    assert_eq!(
        target.assign_from(&source),
        Err(ContourError::ExtentMismatch {
            expected: (8, 8),
            got: (8, 9)
        })
    );
}

#[test]
fn clean_with_zero_radius_is_noop() {
    let mut map = map_with(10, 10, &horizontal_line(5, 0..=9));
    let before = map.clone();
    assert!(map.clean(&CleanParams::new(0, 1, 0.5, 2)).is_none());
    assert_eq!(map, before);
}

#[test]
fn clean_with_empty_index_is_noop() {
    let mut map = ContourMap::new(10, 10).unwrap();
    let before = map.clone();
    assert!(map.clean(&CleanParams::default()).is_none());
    assert_eq!(map, before);
}

#[test]
fn clean_removes_single_isolated_point() {
    let mut map = map_with(10, 10, &[(5, 5, (1.0, 0.0))]);
    let report = map.clean(&CleanParams::new(1, 1, 0.5, 0)).unwrap();
    assert!(map.is_empty());
    assert!(active_set(&map).is_empty());
    assert_eq!(report.input_points, 1);
    assert_eq!(report.output_points(), 0);
}

#[test]
fn clean_keeps_one_point_of_dense_cluster() {
    let mut pts = Vec::new();
    for row in 2..=4 {
        for col in 2..=4 {
            pts.push((col, row, (1.0, 0.0)));
        }
    }
    let mut map = map_with(12, 12, &pts);
    let report = map.clean(&CleanParams::new(1, 2, 0.5, 2)).unwrap();

    // The center has the most agreeing neighbors and wins the tile.
    assert_eq!(map.index(), &[3 * 12 + 3]);
    assert_index_matches_active(&map);
    assert_eq!(report.after_orientation, 9);
    assert_eq!(report.after_isolation, vec![9, 9, 9, 9]);
    assert_eq!(report.after_decimation, 1);
}

#[test]
fn clean_peels_line_ends_for_exactly_four_passes() {
    let mut map = map_with(32, 32, &horizontal_line(10, 5..=24));
    let report = map.clean(&CleanParams::new(2, 3, 0.5, 0)).unwrap();

    let survivors: Vec<usize> = map.index().iter().map(|&m| m % 32).collect();
    assert_eq!(survivors, (10..=19).collect::<Vec<_>>());
    assert_eq!(report.after_orientation, 18);
    assert_eq!(report.after_isolation, vec![16, 14, 12, 10]);

    // The new line ends were checked against the previous pass, not the
    // final set: they now have one neighbor fewer than required.
    let end = map.position(10, 10).unwrap();
    let neighbors = map
        .index()
        .iter()
        .filter(|&&m| m != end && (m as isize - end as isize).abs() <= 2)
        .count();
    assert_eq!(neighbors, 2);
}

#[test]
fn clean_removes_corner_points() {
    let mut pts = horizontal_line(10, 10..=25);
    pts.extend((11..=25).map(|row| (10, row, (0.0, 1.0))));
    let mut map = map_with(32, 32, &pts);
    map.clean(&CleanParams::new(2, 2, 0.9, 0)).unwrap();

    for (m, _) in map.points() {
        let (col, row) = (m % 32, m / 32);
        let near_corner = col.abs_diff(10) <= 2 && row.abs_diff(10) <= 2;
        assert!(!near_corner, "corner point ({col}, {row}) survived");
    }
    assert!(map.is_active(map.position(20, 10).unwrap()));
    assert!(map.is_active(map.position(10, 20).unwrap()));
}

#[test]
fn clean_drops_points_in_outer_frame() {
    let mut map = map_with(16, 16, &horizontal_line(0, 0..=15));
    map.insert(3, 1, point(3, 1, (1.0, 0.0))).unwrap();
    for (col, row, t) in horizontal_line(8, 0..=15) {
        map.insert(col, row, point(col, row, t)).unwrap();
    }

    let report = map.clean(&CleanParams::new(2, 2, 0.5, 0)).unwrap();
    assert_index_matches_active(&map);
    assert_eq!(report.border_excluded, 16 + 1 + 4);
    for (m, _) in map.points() {
        assert_eq!(m / 16, 8);
        let col = m % 16;
        assert!((2..14).contains(&col));
    }
}

#[test]
fn decimation_keeps_at_most_one_point_per_tile() {
    let mut map = map_with(40, 40, &circle(20.0, 20.0, 8.0));
    let before = map.len();
    let report = map.clean(&CleanParams::new(2, 2, 0.5, 2)).unwrap();
    assert!(!map.is_empty());
    assert!(map.len() < before);
    assert_index_matches_active(&map);
    assert_eq!(report.output_points(), map.len());

    let mut per_tile: HashMap<(usize, usize), usize> = HashMap::new();
    for &m in map.index() {
        *per_tile.entry(((m / 40) / 5, (m % 40) / 5)).or_default() += 1;
    }
    assert!(per_tile.values().all(|&n| n == 1), "{per_tile:?}");
}

#[test]
fn decimation_ties_keep_the_tile_anchor() {
    // Two parallel rows: every interior point has the same agreement score.
    let mut pts = horizontal_line(3, 0..=9);
    pts.extend(horizontal_line(4, 0..=9));
    let mut map = map_with(10, 10, &pts);
    map.clean(&CleanParams::new(1, 1, 0.5, 1)).unwrap();

    // 3x3 tiles are anchored at rows/cols 1, 4, 7. The anchor is seen first
    // and equal scores cannot displace it.
    assert_eq!(map.index(), &[41, 44, 47]);
    assert_index_matches_active(&map);
}

#[test]
fn clean_on_map_smaller_than_window_empties_it() {
    let mut map = map_with(4, 4, &horizontal_line(2, 0..=3));
    let report = map.clean(&CleanParams::new(2, 1, 0.5, 0)).unwrap();
    assert!(map.is_empty());
    assert_index_matches_active(&map);
    assert_eq!(report.border_excluded, 4);
}

#[test]
fn oversized_decimation_tiles_leave_points_in_place() {
    let pts = horizontal_line(5, 1..=10);
    let mut reference = map_with(12, 12, &pts);
    reference.clean(&CleanParams::new(1, 1, 0.5, 0)).unwrap();

    for min_distance in [12, usize::MAX / 2 + 1, usize::MAX] {
        let mut map = map_with(12, 12, &pts);
        let report = map.clean(&CleanParams::new(1, 1, 0.5, min_distance)).unwrap();
        assert_eq!(map.index(), reference.index(), "min distance {min_distance}");
        assert_eq!(report.after_decimation, reference.len());
        assert_index_matches_active(&map);
    }
}
