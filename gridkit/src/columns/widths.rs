//! Column-width solving.

use crate::model::Column;

/// Minimum width applied when a column declares none.
pub const DEFAULT_MIN_WIDTH: u32 = 40;

/// Computes one pixel width per column, in input order.
///
/// Columns partition into three groups:
/// - **fixed**: a declared `width`, clamped to `max(width, min_width)`;
/// - **flex**: share `container - sum(fixed)` proportionally to their flex
///   weight, each clamped to its minimum;
/// - **auto**: split whatever remains after fixed and flex evenly, each
///   clamped to its minimum.
///
/// Integer remainders from even splits go to the earliest columns of the
/// group, so results are deterministic.
pub fn solve_widths(columns: &[Column], container_width: u32) -> Vec<u32> {
    let mut widths = vec![0u32; columns.len()];

    let min_of = |col: &Column| col.min_width.unwrap_or(DEFAULT_MIN_WIDTH);

    let mut fixed_total: u64 = 0;
    for (i, col) in columns.iter().enumerate() {
        if let Some(width) = col.width {
            widths[i] = width.max(min_of(col));
            fixed_total += widths[i] as u64;
        }
    }

    let mut remaining = (container_width as u64).saturating_sub(fixed_total);

    let flex_indices: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.width.is_none() && c.flex.is_some())
        .map(|(i, _)| i)
        .collect();
    let flex_total: u64 = flex_indices
        .iter()
        .map(|&i| columns[i].flex.unwrap_or(0) as u64)
        .sum();

    if !flex_indices.is_empty() && flex_total > 0 {
        let pool = remaining;
        let mut allocated: u64 = 0;
        for &i in &flex_indices {
            let share = pool * columns[i].flex.unwrap_or(0) as u64 / flex_total;
            widths[i] = (share as u32).max(min_of(&columns[i]));
            allocated += widths[i] as u64;
        }
        remaining = remaining.saturating_sub(allocated);
    }

    let auto_indices: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.width.is_none() && c.flex.is_none())
        .map(|(i, _)| i)
        .collect();

    if !auto_indices.is_empty() {
        let n = auto_indices.len() as u64;
        let each = remaining / n;
        let mut leftover = remaining % n;
        for &i in &auto_indices {
            let mut width = each;
            if leftover > 0 {
                width += 1;
                leftover -= 1;
            }
            widths[i] = (width as u32).max(min_of(&columns[i]));
        }
    }

    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_widths_are_honored() {
        let cols = vec![
            Column::new("a", "A").width(120),
            Column::new("b", "B").width(80),
        ];
        assert_eq!(solve_widths(&cols, 1000), vec![120, 80]);
    }

    #[test]
    fn test_fixed_width_clamped_to_min() {
        let cols = vec![Column::new("a", "A").width(10).min_width(50)];
        assert_eq!(solve_widths(&cols, 1000), vec![50]);
    }

    #[test]
    fn test_flex_splits_remaining_proportionally() {
        let cols = vec![
            Column::new("a", "A").width(100),
            Column::new("b", "B").flex(1),
            Column::new("c", "C").flex(3),
        ];
        // remaining = 900; 1:3 split.
        assert_eq!(solve_widths(&cols, 1000), vec![100, 225, 675]);
    }

    #[test]
    fn test_auto_splits_leftover_evenly_with_remainder_first() {
        let cols = vec![
            Column::new("a", "A"),
            Column::new("b", "B"),
            Column::new("c", "C"),
        ];
        // 1000 / 3 = 333 r1; first column takes the extra pixel.
        assert_eq!(solve_widths(&cols, 1000), vec![334, 333, 333]);
    }

    #[test]
    fn test_overflowing_fixed_leaves_min_for_auto() {
        let cols = vec![
            Column::new("a", "A").width(900),
            Column::new("b", "B").width(200),
            Column::new("c", "C"),
        ];
        let widths = solve_widths(&cols, 1000);
        assert_eq!(widths[0], 900);
        assert_eq!(widths[1], 200);
        assert_eq!(widths[2], DEFAULT_MIN_WIDTH, "auto clamps to min when nothing remains");
    }
}
