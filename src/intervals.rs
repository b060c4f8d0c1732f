// Interval utilities - connected components over boolean sequences
//
// Maximal runs of `true` become half-open [start, end) intervals. These are
// used for frame-exposure detection in the time-base aligner and for song
// event extraction, and are generic enough to reuse on any boolean mask.

use crate::types::Interval;

/// Return the maximal runs of `true` in a boolean sequence as half-open
/// [start, end) intervals, ascending by start.
///
/// Runs are disjoint by construction, so the output is always sorted and
/// non-overlapping.
pub fn connected_components(mask: &[bool]) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut run_start = None;

    for (i, &on) in mask.iter().enumerate() {
        match (on, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                intervals.push(Interval::new(start, i));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        intervals.push(Interval::new(start, mask.len()));
    }

    intervals
}

/// Convert intervals back into a boolean mask.
///
/// Any index covered by at least one [start, end) interval is `true`. If
/// `size` is not given, the largest interval end is used.
pub fn intervals_to_mask(intervals: &[Interval], size: Option<usize>) -> Vec<bool> {
    let size = size.unwrap_or_else(|| intervals.iter().map(|iv| iv.end).max().unwrap_or(0));
    let mut mask = vec![false; size];
    for iv in intervals {
        for m in mask.iter_mut().take(iv.end.min(size)).skip(iv.start) {
            *m = true;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mask_has_no_components() {
        assert!(connected_components(&[]).is_empty());
        assert!(connected_components(&[false, false]).is_empty());
    }

    #[test]
    fn test_single_run_spanning_to_end() {
        let mask = [false, true, true, true];
        assert_eq!(connected_components(&mask), vec![Interval::new(1, 4)]);
    }

    #[test]
    fn test_multiple_runs_ascending() {
        let mask = [true, false, true, true, false, true];
        assert_eq!(
            connected_components(&mask),
            vec![
                Interval::new(0, 1),
                Interval::new(2, 4),
                Interval::new(5, 6)
            ]
        );
    }

    #[test]
    fn test_mask_roundtrip_reconstructs_exactly() {
        let mask = vec![
            false, true, true, false, false, true, false, true, true, true,
        ];
        let intervals = connected_components(&mask);
        assert_eq!(intervals_to_mask(&intervals, Some(mask.len())), mask);
    }

    #[test]
    fn test_intervals_roundtrip_when_disjoint_and_sorted() {
        let intervals = vec![Interval::new(2, 5), Interval::new(7, 8)];
        let mask = intervals_to_mask(&intervals, None);
        assert_eq!(mask.len(), 8);
        assert_eq!(connected_components(&mask), intervals);
    }
}
