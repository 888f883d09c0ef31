pub mod json;
pub mod text;

use std::collections::HashSet;

use serde::Serialize;

use crate::table::{ADJUSTED_P_COLUMN, ResultTable};

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub tool: ToolSummary,
    pub engines: EnginePair,
    pub significance_alpha: f64,
    pub pre_shrunk: JoinSummary,
    pub post_shrunk: JoinSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnginePair {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinSummary {
    pub left_features: usize,
    pub right_features: usize,
    pub shared_features: usize,
    pub left_only_features: usize,
    pub right_only_features: usize,
    pub columns: Vec<ColumnAgreement>,
    pub significance: SignificanceAgreement,
}

/// Agreement of one column present in both engines' tables, over features
/// where both values are finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAgreement {
    pub column: String,
    pub pairs: usize,
    pub pearson: Option<f64>,
    pub max_abs_diff: Option<f64>,
    pub mean_abs_diff: Option<f64>,
}

/// Shared features split by `padj < alpha` on each side. Missing padj counts
/// as not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignificanceAgreement {
    pub both: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub neither: usize,
}

pub struct JoinInputs<'a> {
    pub left: &'a ResultTable,
    pub right: &'a ResultTable,
    pub joined: &'a ResultTable,
    pub left_suffix: &'a str,
    pub right_suffix: &'a str,
}

pub fn summarize_join(inputs: &JoinInputs<'_>, alpha: f64) -> JoinSummary {
    let JoinInputs {
        left,
        right,
        joined,
        left_suffix,
        right_suffix,
    } = *inputs;

    let shared: Vec<&str> = left
        .feature_ids()
        .iter()
        .map(String::as_str)
        .filter(|id| right.contains(id))
        .collect();
    let left_ids: HashSet<&str> = left.feature_ids().iter().map(String::as_str).collect();
    let right_only = right
        .feature_ids()
        .iter()
        .filter(|id| !left_ids.contains(id.as_str()))
        .count();

    let right_columns: HashSet<&str> = right.columns().iter().map(String::as_str).collect();
    let columns = left
        .columns()
        .iter()
        .filter(|c| right_columns.contains(c.as_str()))
        .map(|c| {
            let l = joined.column(&format!("{c}{left_suffix}")).unwrap_or_default();
            let r = joined.column(&format!("{c}{right_suffix}")).unwrap_or_default();
            column_agreement(c, &l, &r)
        })
        .collect();

    let mut significance = SignificanceAgreement::default();
    if left.has_column(ADJUSTED_P_COLUMN) && right.has_column(ADJUSTED_P_COLUMN) {
        for id in &shared {
            let sig = |t: &ResultTable| t.get(id, ADJUSTED_P_COLUMN).is_some_and(|p| p < alpha);
            match (sig(left), sig(right)) {
                (true, true) => significance.both += 1,
                (true, false) => significance.left_only += 1,
                (false, true) => significance.right_only += 1,
                (false, false) => significance.neither += 1,
            }
        }
    }

    JoinSummary {
        left_features: left.len(),
        right_features: right.len(),
        shared_features: shared.len(),
        left_only_features: left.len() - shared.len(),
        right_only_features: right_only,
        columns,
        significance,
    }
}

pub fn column_agreement(
    column: &str,
    left: &[Option<f64>],
    right: &[Option<f64>],
) -> ColumnAgreement {
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .zip(right)
        .filter_map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) if l.is_finite() && r.is_finite() => Some((*l, *r)),
            _ => None,
        })
        .collect();

    let (max_abs_diff, mean_abs_diff) = if pairs.is_empty() {
        (None, None)
    } else {
        let diffs: Vec<f64> = pairs.iter().map(|(l, r)| (l - r).abs()).collect();
        let max = diffs.iter().copied().fold(0.0, f64::max);
        let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
        (Some(max), Some(mean))
    };

    ColumnAgreement {
        column: column.to_string(),
        pairs: pairs.len(),
        pearson: pearson(&pairs),
        max_abs_diff,
        mean_abs_diff,
    }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_l = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_r = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_l = 0.0;
    let mut var_r = 0.0;
    for (l, r) in pairs {
        let dl = l - mean_l;
        let dr = r - mean_r;
        cov += dl * dr;
        var_l += dl * dl;
        var_r += dr * dr;
    }
    if var_l == 0.0 || var_r == 0.0 {
        return None;
    }
    Some((cov / (var_l.sqrt() * var_r.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
