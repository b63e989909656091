//! Scan-line polygon fill.
//!
//! A cell `(r, c)` is inside when an odd number of polygon edges cross row
//! `r` strictly to the right of column `c`. An edge crosses row `r` when one
//! endpoint is at or above `r` and the other strictly below (half-open), so
//! horizontal edges never cross and a shared vertex is counted once. On each
//! row the sorted crossings pair up into half-open spans `[x0, x1)`.

/// Cells covered by the polygon `vertices` (`(row, col)` pairs, closed
/// implicitly), clipped to a `rows x cols` grid, in row-major order.
///
/// Degenerate polygons (fewer than three vertices, zero area, or any
/// non-finite coordinate) cover nothing.
pub fn polygon_cells(vertices: &[(f64, f64)], rows: usize, cols: usize) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    if vertices.len() < 3 || rows == 0 || cols == 0 {
        return cells;
    }
    if vertices.iter().any(|&(r, c)| !r.is_finite() || !c.is_finite()) {
        return cells;
    }

    let (mut r_min, mut r_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(r, _) in vertices {
        r_min = r_min.min(r);
        r_max = r_max.max(r);
    }
    let first = r_min.max(0.0).ceil();
    let last = r_max.ceil().min((rows - 1) as f64);
    if first > last {
        return cells;
    }

    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());
    for row in (first as usize)..=(last as usize) {
        row_crossings(vertices, row as f64, &mut crossings);
        for span in crossings.chunks_exact(2) {
            let start = span[0].ceil().max(0.0);
            let end = span[1].ceil().min(cols as f64);
            if start >= end {
                continue;
            }
            cells.extend((start as usize..end as usize).map(|c| (row, c)));
        }
    }
    cells
}

/// Sorted columns where the polygon boundary crosses `row`.
fn row_crossings(vertices: &[(f64, f64)], row: f64, out: &mut Vec<f64>) {
    out.clear();
    let n = vertices.len();
    let mut j = n - 1;
    for i in 0..n {
        let (ri, ci) = vertices[i];
        let (rj, cj) = vertices[j];
        if (ri <= row && row < rj) || (rj <= row && row < ri) {
            out.push((cj - ci) * (row - ri) / (rj - ri) + ci);
        }
        j = i;
    }
    out.sort_by(|a, b| a.total_cmp(b));
}
