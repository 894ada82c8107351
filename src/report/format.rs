//! Terminal tables for fit and extremum runs.

use crate::domain::{ExtremumKind, ExtremumResult, FitConfig, FreqUnit};
use crate::error::AppError;
use crate::report::{DatasetReport, fit_label, format_complex, impedance_label};

/// Format the full fit run summary (settings + per-dataset table + labels).
pub fn format_fit_summary(reports: &[DatasetReport], config: &FitConfig) -> String {
    let unit = config.unit.label();
    let mut out = String::new();

    out.push_str("=== rfq - Resonance Fit ===\n");
    out.push_str(&format!(
        "Trace: {} ({}) | range: {} | baseline: {:?} | z0: {} Ω\n",
        config.sparam.display_name(),
        config.scale.label(),
        config.range,
        config.options.baseline,
        config.z0
    ));

    out.push_str(&format!(
        "\n{:<16} {:>12} {:>10} {:>10} {:>10} {:>9} {:>20}\n",
        "dataset",
        format!("center[{unit}]"),
        "sigma",
        "amplitude",
        "baseline",
        "Q",
        "Z(center)[Ω]"
    ));
    out.push_str(&format!("{}\n", "-".repeat(93)));

    for r in reports {
        match &r.fit {
            Ok(fit) => {
                let z = r.impedance.map(format_complex).unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{:<16} {:>12.4} {:>10.4} {:>10.4} {:>10.4} {:>9.1} {:>20}\n",
                    truncate_name(&r.name),
                    fit.params.center,
                    fit.params.sigma,
                    fit.params.amplitude,
                    fit.params.background,
                    fit.q,
                    z
                ));
            }
            Err(err) => {
                out.push_str(&format!("{:<16} fit failed: {err}\n", truncate_name(&r.name)));
            }
        }
    }

    let labels = format_labels(reports, config.unit);
    if !labels.is_empty() {
        out.push_str("\nAnnotations:\n");
        out.push_str(&labels);
    }

    out
}

/// Legend labels for every successful fit, one block per dataset.
pub fn format_labels(reports: &[DatasetReport], unit: FreqUnit) -> String {
    let mut out = String::new();
    for r in reports {
        let Ok(fit) = &r.fit else { continue };
        out.push_str(&format!("  ({})\n", fit_label(&r.name, fit, unit).replace('\n', ", ")));
        if let Some(z) = r.impedance {
            out.push_str(&format!("  ({})\n", impedance_label(fit, z, unit).replace('\n', ", ")));
        }
    }
    out
}

/// Format extremum search results.
pub fn format_extrema(
    results: &[(String, Result<ExtremumResult, AppError>)],
    kind: ExtremumKind,
    unit: FreqUnit,
) -> String {
    let mut out = String::new();
    let label = match kind {
        ExtremumKind::Min => "min",
        ExtremumKind::Max => "max",
    };
    out.push_str(&format!(
        "{:<16} {:>14} {:>12} {:>8}\n",
        "dataset",
        format!("freq[{}]", unit.label()),
        label,
        "index"
    ));
    for (name, result) in results {
        match result {
            Ok(r) => out.push_str(&format!(
                "{:<16} {:>14.6} {:>12.4} {:>8}\n",
                truncate_name(name),
                r.coordinate,
                r.value,
                r.index
            )),
            Err(err) => out.push_str(&format!("{:<16} error: {err}\n", truncate_name(name))),
        }
    }
    out
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= 16 {
        name.to_string()
    } else {
        let head: String = name.chars().take(15).collect();
        format!("{head}…")
    }
}
