use crate::report::{ColumnAgreement, ComparisonSummary, JoinSummary};

pub fn render_summary(summary: &ComparisonSummary) -> String {
    let mut out = String::new();
    out.push_str("DESeq2 comparison\n");
    out.push_str("=================\n\n");
    out.push_str(&format!(
        "Engines: {} (left) vs {} (right)\n",
        summary.engines.left, summary.engines.right
    ));
    out.push_str(&format!(
        "Significance threshold: padj < {}\n\n",
        summary.significance_alpha
    ));

    render_join(&mut out, "Unshrunk fold changes", &summary.pre_shrunk);
    render_join(&mut out, "Shrunk fold changes", &summary.post_shrunk);
    out
}

fn render_join(out: &mut String, title: &str, join: &JoinSummary) {
    out.push_str(title);
    out.push_str(":\n");
    out.push_str(&format!(
        "- Features: {} shared, {} left only, {} right only\n",
        join.shared_features, join.left_only_features, join.right_only_features
    ));
    for column in &join.columns {
        out.push_str(&format!("- {}\n", render_column(column)));
    }
    let sig = &join.significance;
    out.push_str(&format!(
        "- Significant: {} both, {} left only, {} right only, {} neither\n\n",
        sig.both, sig.left_only, sig.right_only, sig.neither
    ));
}

fn render_column(column: &ColumnAgreement) -> String {
    format!(
        "{}: n={} r={} max|diff|={} mean|diff|={}",
        column.column,
        column.pairs,
        fmt_opt(column.pearson),
        fmt_opt(column.max_abs_diff),
        fmt_opt(column.mean_abs_diff),
    )
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() >= 1e-4 || v == 0.0 => format!("{v:.4}"),
        Some(v) => format!("{v:.3e}"),
        None => "NA".to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
