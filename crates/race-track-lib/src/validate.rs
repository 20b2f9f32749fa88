//! Validation and normalization of candidate paths
//!
//! Self-overlap is detected on a unit grid: points are floored to integer cells,
//! consecutive duplicates are dropped and diagonal hops are bridged, after which any
//! repeated cell means the path crosses or retraces itself.

use geo::Point;
use std::collections::HashSet;

/// Integer grid cell of a quantized point
pub type GridCell = (i64, i64);

/// Trailing cells ignored by the overlap test, where the path closes onto its start
pub const OVERLAP_TAIL_EXCLUSION: usize = 10;

/// Empty border left around a normalized track
pub const NORMALIZE_MARGIN: f64 = 10.0;

/// Floor every coordinate to an integer cell
pub fn quantize(points: &[Point<f64>]) -> Vec<GridCell> {
    points
        .iter()
        .map(|p| (p.x().floor() as i64, p.y().floor() as i64))
        .collect()
}

/// Drop consecutive duplicate cells, keeping the first of each run
pub fn compactify(mut cells: Vec<GridCell>) -> Vec<GridCell> {
    cells.dedup();
    cells
}

/// Insert one unit step after every hop that is not already a unit step
///
/// Two cells that only touch diagonally would otherwise let a crossing path slip
/// through the duplicate test.
pub fn fill_diagonal_gaps(cells: &[GridCell]) -> Vec<GridCell> {
    let mut filled = Vec::with_capacity(cells.len() * 2);
    for pair in cells.windows(2) {
        let ((sx, sy), (ex, ey)) = (pair[0], pair[1]);
        filled.push(pair[0]);
        if (ex - sx).abs() + (ey - sy).abs() > 1 {
            let step = if ex != sx {
                (sx + (ex - sx).signum(), sy)
            } else {
                (sx, sy + (ey - sy).signum())
            };
            filled.push(step);
        }
    }
    if let Some(&last) = cells.last() {
        filled.push(last);
    }
    filled
}

/// Check a compacted cell sequence for self-overlap
///
/// The last [`OVERLAP_TAIL_EXCLUSION`] cells are ignored; a path shorter than that is
/// never reported.
pub fn has_overlap(cells: &[GridCell]) -> bool {
    let kept = &cells[..cells.len().saturating_sub(OVERLAP_TAIL_EXCLUSION)];
    if kept.is_empty() {
        return false;
    }

    let filled = fill_diagonal_gaps(kept);
    let mut seen = HashSet::with_capacity(filled.len());
    !filled.iter().all(|cell| seen.insert(*cell))
}

/// Shift points so the smallest coordinates sit at [`NORMALIZE_MARGIN`]
///
/// Returns the shifted points together with a `(width, height)` that encloses them
/// with the same margin on the far side. Applying it again is a no-op.
pub fn normalize_to_positive(points: &[Point<f64>]) -> (Vec<Point<f64>>, u32, u32) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x());
        min_y = min_y.min(p.y());
        max_x = max_x.max(p.x());
        max_y = max_y.max(p.y());
    }

    let border = (2.0 * NORMALIZE_MARGIN) as u32;
    if points.is_empty() {
        return (Vec::new(), border, border);
    }

    let shift = Point::new(NORMALIZE_MARGIN - min_x, NORMALIZE_MARGIN - min_y);
    let shifted = points.iter().map(|&p| p + shift).collect();
    let width = (max_x - min_x).floor() as u32 + border;
    let height = (max_y - min_y).floor() as u32 + border;
    (shifted, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_loop(side: i64) -> Vec<GridCell> {
        let mut cells = Vec::new();
        for x in 0..side {
            cells.push((x, 0));
        }
        for y in 0..side {
            cells.push((side, y));
        }
        for x in (1..=side).rev() {
            cells.push((x, side));
        }
        for y in (1..=side).rev() {
            cells.push((0, y));
        }
        cells
    }

    #[test]
    fn test_quantize_floors() {
        let points = [Point::new(1.9, 2.1), Point::new(-0.5, 3.99)];
        assert_eq!(quantize(&points), vec![(1, 2), (-1, 3)]);
    }

    #[test]
    fn test_quantize_consistent_across_integer_shift() {
        // Raw points straddle the axes; the normalized copy is shifted by whole units
        let raw = [
            Point::new(-0.5, -0.5),
            Point::new(0.5, -0.5),
            Point::new(-1.5, 2.25),
            Point::new(0.0, -3.0),
        ];
        let shift = Point::new(12.0, 7.0);
        let shifted: Vec<_> = raw.iter().map(|&p| p + shift).collect();

        let expected: Vec<GridCell> = quantize(&raw)
            .into_iter()
            .map(|(x, y)| (x + 12, y + 7))
            .collect();
        assert_eq!(quantize(&shifted), expected);
        // Points on either side of zero land in different cells
        assert_ne!(quantize(&raw)[0], quantize(&raw)[1]);
    }

    #[test]
    fn test_compactify_drops_consecutive_duplicates() {
        let cells = vec![(0, 0), (0, 0), (1, 0), (1, 0), (0, 0)];
        assert_eq!(compactify(cells), vec![(0, 0), (1, 0), (0, 0)]);
    }

    #[test]
    fn test_compactify_idempotent() {
        let cells = vec![(3, 3), (3, 3), (3, 4), (5, 5), (5, 5), (5, 5)];
        let once = compactify(cells);
        assert_eq!(compactify(once.clone()), once);
    }

    #[test]
    fn test_fill_diagonal_gaps() {
        let filled = fill_diagonal_gaps(&[(0, 0), (1, 1), (1, 2), (1, 4)]);
        assert_eq!(filled, vec![(0, 0), (1, 0), (1, 1), (1, 2), (1, 3), (1, 4)]);
    }

    #[test]
    fn test_loop_without_crossing_passes() {
        assert!(!has_overlap(&square_loop(20)));
    }

    #[test]
    fn test_retraced_path_is_flagged() {
        let mut cells: Vec<GridCell> = (0..30).map(|x| (x, 0)).collect();
        cells.extend((0..29).rev().map(|x| (x, 0)));
        // Trailing cells are excluded from the test
        cells.extend((1..=OVERLAP_TAIL_EXCLUSION as i64).map(|y| (0, -y)));
        assert!(has_overlap(&cells));
    }

    #[test]
    fn test_diagonal_crossing_is_flagged() {
        // Two diagonals crossing between cell centers share no cell until bridged
        let mut cells: Vec<GridCell> = (0..10).map(|i| (i, i)).collect();
        cells.extend([(10, 9), (11, 9)]);
        cells.extend((-1..9).rev().map(|y| (11, y)));
        cells.push((10, -1));
        cells.extend((0..10).map(|j| (9 - j, j)));
        cells.extend((10..20).map(|y| (0, y)));

        let unique: HashSet<&GridCell> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
        assert!(has_overlap(&cells));
    }

    #[test]
    fn test_short_paths_never_overlap() {
        let cells: Vec<GridCell> = vec![(0, 0); OVERLAP_TAIL_EXCLUSION];
        assert!(!has_overlap(&cells));
        assert!(!has_overlap(&[]));
    }

    #[test]
    fn test_normalize_shifts_into_positive_quadrant() {
        let points = [Point::new(-3.25, 2.5), Point::new(10.6, -7.3)];
        let (shifted, width, height) = normalize_to_positive(&points);

        let min_x = shifted.iter().map(|p| p.x()).fold(f64::INFINITY, f64::min);
        let min_y = shifted.iter().map(|p| p.y()).fold(f64::INFINITY, f64::min);
        assert!((min_x - NORMALIZE_MARGIN).abs() < 1e-9);
        assert!((min_y - NORMALIZE_MARGIN).abs() < 1e-9);
        assert_eq!(width, 13 + 20);
        assert_eq!(height, 9 + 20);
        for p in &shifted {
            assert!(p.x() >= 0.0 && p.x() <= width as f64);
            assert!(p.y() >= 0.0 && p.y() <= height as f64);
        }
    }

    #[test]
    fn test_normalize_is_fixed_point() {
        let points = [
            Point::new(-3.25, 2.5),
            Point::new(10.6, -7.3),
            Point::new(4.0, 4.4),
        ];
        let (once, width, height) = normalize_to_positive(&points);
        let (twice, width2, height2) = normalize_to_positive(&once);
        assert_eq!((width, height), (width2, height2));
        for (a, b) in once.iter().zip(&twice) {
            assert!((a.x() - b.x()).abs() < 1e-9);
            assert!((a.y() - b.y()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_empty() {
        let (points, width, height) = normalize_to_positive(&[]);
        assert!(points.is_empty());
        assert_eq!((width, height), (20, 20));
    }
}
