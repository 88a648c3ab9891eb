//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerical code stays free of presentation concerns
//! - output changes are localized

use crate::models::{GaussHermiteExpansion, GaussHermiteMatrix};
use crate::report::ReconstructionQuality;

/// Format the run header (profile description and settings).
pub fn format_run_header(label: &str, range: (f64, f64), integral: Option<f64>) -> String {
    let mut out = String::new();
    out.push_str("=== gh - Gauss-Hermite expansion ===\n");
    out.push_str(&format!("Profile: {label}\n"));
    out.push_str(&format!("Range: [{:.4}, {:.4}]\n", range.0, range.1));
    if let Some(integral) = integral {
        out.push_str(&format!("Integral: {integral:.6}\n"));
    }
    out
}

/// One block per expansion: envelope, fit diagnostics, quality, coefficients.
pub fn format_expansions(
    expansions: &[GaussHermiteExpansion],
    quality: &[ReconstructionQuality],
) -> String {
    let mut out = String::new();
    for (gh, q) in expansions.iter().zip(quality.iter()) {
        out.push_str(&format!("\nOrder {}:\n", gh.order()));
        let env = gh.envelope();
        out.push_str(&format!(
            "- envelope: amplitude={:.6} center={:.6} width={:.6}\n",
            env.amplitude, env.center, env.width
        ));
        match gh.fit_report() {
            Some(fit) => out.push_str(&format!(
                "- fit: {:?} {} after {} iterations / {} evaluations, cost={:.3e} (seed: norm={:.4} mean={:.4} stddev={:.4})\n",
                fit.strategy,
                if fit.converged { "converged" } else { "NOT converged" },
                fit.iterations,
                fit.evaluations,
                fit.cost,
                fit.seed.norm,
                fit.seed.mean,
                fit.seed.stddev,
            )),
            None => out.push_str("- fit: envelope given\n"),
        }
        out.push_str(&format!("- norm: {:.6}\n", gh.norm()));
        out.push_str(&format!(
            "- residual: rms={:.3e} max={:.3e} rel-L2={:.3e}\n",
            q.rms, q.max_abs, q.relative_l2
        ));
        out.push_str(&format_coefficient_table(gh.coefficients()));
    }
    out
}

/// Index/value table of GH coefficients.
pub fn format_coefficient_table(coefficients: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>6} {:>14}", "n", "h_n").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<14}", "", "").trim_end());
    out.push('\n');
    for (n, h) in coefficients.iter().enumerate() {
        out.push_str(&format!("{n:>6} {h:>14.6e}\n"));
    }
    out
}

/// Summary of a basis-to-GH matrix with its rows.
pub fn format_matrix(degree: usize, grid: &[f64], matrix: &GaussHermiteMatrix) -> String {
    let mut out = String::new();
    let env = matrix.envelope();
    out.push_str("=== gh - B-spline to GH matrix ===\n");
    out.push_str(&format!(
        "Basis: degree {degree}, {} breakpoints on [{:.4}, {:.4}], {} functions\n",
        grid.len(),
        grid.first().copied().unwrap_or(f64::NAN),
        grid.last().copied().unwrap_or(f64::NAN),
        matrix.num_functions()
    ));
    out.push_str(&format!(
        "Envelope: amplitude={:.6} center={:.6} width={:.6}\n",
        env.amplitude, env.center, env.width
    ));
    out.push_str(&format!("Order: {}\n\n", matrix.order()));
    for m in 0..=matrix.order() {
        out.push_str(&format!("h_{m:<3} {}\n", fmt_vec(&matrix.row(m))));
    }
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Envelope;
    use crate::models::gauss_hermite_matrix;

    #[test]
    fn coefficient_table_has_one_row_per_term() {
        let table = format_coefficient_table(&[1.0, 0.0, -0.05]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("h_n"));
        assert!(lines[4].trim_start().starts_with('2'));
        assert!(lines[4].contains("-5.000000e-2"), "{table}");
    }

    #[test]
    fn expansion_block_mentions_given_envelope() {
        let f = |x: f64| (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
        let gh = GaussHermiteExpansion::with_envelope(&f, 2, Envelope::new(1.0, 0.0, 1.0)).unwrap();
        let q = crate::report::compute_quality(&f, &gh, (-4.0, 4.0), 41).unwrap();
        let text = format_expansions(&[gh], &[q]);
        assert!(text.contains("Order 2:"), "{text}");
        assert!(text.contains("envelope given"), "{text}");
        assert!(text.contains("norm: 1.000000"), "{text}");
    }

    #[test]
    fn matrix_summary_lists_every_row() {
        let grid = [0.0, 1.0, 2.0];
        let mat = gauss_hermite_matrix(1, &grid, 2, &Envelope::new(1.0, 1.0, 1.0)).unwrap();
        let text = format_matrix(1, &grid, &mat);
        assert!(text.contains("3 functions"), "{text}");
        assert_eq!(text.lines().filter(|l| l.starts_with("h_")).count(), 3);
    }
}
