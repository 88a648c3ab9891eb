//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - profile samples: `o`
//! - expansions: one line style per order (`-`, `*`, `+`, `#`, `~`, cycling)

use crate::domain::ScalarFunction;
use crate::io::ExpansionFile;
use crate::models::GaussHermiteExpansion;

const CURVE_CHARS: [char; 5] = ['-', '*', '+', '#', '~'];

/// Render `profile` (as points) and each expansion (as a line) over `range`.
pub fn render_ascii_plot<F: ScalarFunction + ?Sized>(
    profile: &F,
    expansions: &[GaussHermiteExpansion],
    range: (f64, f64),
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (x_min, x_max) = if range.1 > range.0 {
        range
    } else {
        (range.0 - 1.0, range.0 + 1.0)
    };

    let points = sample_curve(|x| profile.value(x), x_min, x_max, width);
    let curves: Vec<(String, char, Vec<(f64, f64)>)> = expansions
        .iter()
        .enumerate()
        .map(|(i, gh)| {
            (
                format!("order {}", gh.order()),
                CURVE_CHARS[i % CURVE_CHARS.len()],
                sample_curve(|x| gh.value(x), x_min, x_max, width),
            )
        })
        .collect();
    render_plot(&points, &curves, x_min, x_max, width, height)
}

/// Render a plot from a saved expansion JSON (its precomputed grid).
pub fn render_ascii_plot_from_expansion_file(
    doc: &ExpansionFile,
    width: usize,
    height: usize,
) -> String {
    let x = &doc.grid.x;
    let (x_min, x_max) = match (x.first(), x.last()) {
        (Some(&lo), Some(&hi)) if hi > lo => (lo, hi),
        _ => (0.0, 1.0),
    };
    let points: Vec<(f64, f64)> = x
        .iter()
        .copied()
        .zip(doc.grid.profile.iter().copied())
        .collect();
    let curves: Vec<(String, char, Vec<(f64, f64)>)> = doc
        .expansions
        .iter()
        .zip(doc.grid.reconstructions.iter())
        .enumerate()
        .map(|(i, (record, row))| {
            (
                format!("order {}", record.order),
                CURVE_CHARS[i % CURVE_CHARS.len()],
                x.iter().copied().zip(row.iter().copied()).collect(),
            )
        })
        .collect();
    render_plot(&points, &curves, x_min, x_max, width.max(10), height.max(5))
}

fn render_plot(
    points: &[(f64, f64)],
    curves: &[(String, char, Vec<(f64, f64)>)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let all = points
        .iter()
        .chain(curves.iter().flat_map(|(_, _, c)| c.iter()));
    let (y_min, y_max) = y_range(all).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so the samples overlay them.
    for (_, ch, curve) in curves {
        draw_curve(&mut grid, curve, *ch, x_min, x_max, y_min, y_max);
    }
    for &(x, y) in points {
        if !y.is_finite() {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    let mut legend = vec!["o profile".to_string()];
    legend.extend(curves.iter().map(|(label, ch, _)| format!("{ch} {label}")));
    out.push_str(&format!("Legend: {}\n", legend.join(", ")));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn sample_curve(f: impl Fn(f64) -> f64, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, f(x))
        })
        .collect()
}

fn y_range<'a>(values: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in values.filter(|(_, y)| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Envelope;

    #[test]
    fn plot_golden_snapshot_small() {
        let line = |x: f64| x;
        let txt = render_ascii_plot(&line, &[], (0.0, 9.0), 10, 5);
        let expected = concat!(
            "Plot: x=[0.000, 9.000] | y=[-0.45, 9.45]\n",
            "Legend: o profile\n",
            "         o\n",
            "      ooo \n",
            "    oo    \n",
            " ooo      \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn expansions_are_drawn_under_the_samples() {
        let f = |x: f64| (-0.5 * x * x).exp();
        // a too-narrow envelope at low order leaves a visible mismatch at the peak
        let gh = GaussHermiteExpansion::with_envelope(&f, 2, Envelope::new(1.0, 0.0, 0.5)).unwrap();
        let txt = render_ascii_plot(&f, &[gh], (-4.0, 4.0), 40, 12);
        assert!(txt.contains("Legend: o profile, - order 2"), "{txt}");
        let body: String = txt.lines().skip(2).collect();
        assert!(body.contains('o'));
        assert!(body.contains('-'));
        assert_eq!(txt.lines().count(), 14);
    }

    #[test]
    fn saved_expansions_plot_like_live_ones() {
        let f = |x: f64| (-0.5 * x * x).exp();
        let gh = GaussHermiteExpansion::with_envelope(&f, 2, Envelope::new(1.0, 0.0, 0.5)).unwrap();
        let doc = crate::io::expansion_file("gaussian", &f, (-4.0, 4.0), &[gh]);
        let txt = render_ascii_plot_from_expansion_file(&doc, 40, 12);
        assert!(txt.starts_with("Plot: x=[-4.000, 4.000]"), "{txt}");
        assert!(txt.contains("Legend: o profile, - order 2"), "{txt}");
        let body: String = txt.lines().skip(2).collect();
        assert!(body.contains('o') && body.contains('-'));
        assert_eq!(txt.lines().count(), 14);
    }

    #[test]
    fn degenerate_range_and_flat_profile_do_not_panic() {
        let flat = |_x: f64| 1.0;
        let txt = render_ascii_plot(&flat, &[], (2.0, 2.0), 3, 1);
        assert_eq!(txt.lines().count(), 2 + 5);
    }
}
