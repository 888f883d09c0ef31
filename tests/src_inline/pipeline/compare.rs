use super::*;
use std::cell::RefCell;
use std::fs;
use std::path::Path;

use crate::output::{
    PY_POST_SHRUNK_FILE, PY_PRE_SHRUNK_FILE, PY_SIZE_FACTORS_FILE, R_POST_SHRUNK_FILE,
    R_PRE_SHRUNK_FILE, SUMMARY_FILE,
};
use crate::table::{ADJUSTED_P_COLUMN, FOLD_CHANGE_COLUMN, MEAN_COUNT_COLUMN};
use tempfile::tempdir;

struct FakeEngine<'a> {
    name: &'static str,
    files: &'static [&'static str],
    lfc: f64,
    fail: bool,
    calls: &'a RefCell<Vec<&'static str>>,
}

impl DeseqEngine for FakeEngine<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, _data_dir: &Path, out_dir: &Path) -> Result<EngineResults, EngineError> {
        self.calls.borrow_mut().push(self.name);
        assert!(out_dir.is_dir(), "output directory must exist before engines run");
        if self.fail {
            return Err(EngineError::MissingScript("deseq2.R".into()));
        }
        for file in self.files {
            fs::write(out_dir.join(file), "x\n")?;
        }
        let table = |lfc: f64| {
            let mut t = ResultTable::new(
                "",
                vec![
                    MEAN_COUNT_COLUMN.to_string(),
                    FOLD_CHANGE_COLUMN.to_string(),
                    ADJUSTED_P_COLUMN.to_string(),
                ],
            );
            for i in 0..10 {
                let row = vec![Some(10.0 * i as f64), Some(lfc * i as f64), Some(0.01)];
                t.push_row(format!("G{i}"), row).expect("push row");
            }
            t
        };
        Ok(EngineResults {
            pre_shrunk: table(self.lfc),
            post_shrunk: table(self.lfc / 2.0),
        })
    }
}

fn fake<'a>(
    name: &'static str,
    files: &'static [&'static str],
    lfc: f64,
    fail: bool,
    calls: &'a RefCell<Vec<&'static str>>,
) -> FakeEngine<'a> {
    FakeEngine {
        name,
        files,
        lfc,
        fail,
        calls,
    }
}

const PY_FILES: &[&str] = &[PY_PRE_SHRUNK_FILE, PY_POST_SHRUNK_FILE, PY_SIZE_FACTORS_FILE];
const R_FILES: &[&str] = &[R_PRE_SHRUNK_FILE, R_POST_SHRUNK_FILE];

fn request(out_dir: &Path, write_joined: bool) -> CompareRequest {
    CompareRequest {
        data_dir: out_dir.join("unused-data"),
        out_dir: out_dir.to_path_buf(),
        write_joined,
        config: CompareConfig::default(),
    }
}

fn csv_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with(".csv"))
        .collect();
    names.sort();
    names
}

#[test]
fn runs_in_process_engine_first_and_joins_both_tables() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("nested").join("out");
    let calls = RefCell::new(Vec::new());
    let py = fake("pydeseq2", PY_FILES, 1.0, false, &calls);
    let r = fake("r-deseq2", R_FILES, 1.0, false, &calls);

    let comparison = run_comparison(&request(&out, false), &py, &r).expect("compare");

    assert_eq!(*calls.borrow(), vec!["pydeseq2", "r-deseq2"]);
    assert_eq!(comparison.pre_shrunk.len(), 10);
    assert_eq!(
        comparison.pre_shrunk.columns(),
        [
            "baseMean_py",
            "log2FoldChange_py",
            "padj_py",
            "baseMean_r",
            "log2FoldChange_r",
            "padj_r"
        ]
    );
    assert_eq!(comparison.post_shrunk.get("G4", "log2FoldChange_r"), Some(2.0));
    assert_eq!(comparison.summary.engines.left, "pydeseq2");
    assert_eq!(comparison.summary.pre_shrunk.shared_features, 10);
    assert_eq!(comparison.summary.pre_shrunk.significance.both, 10);

    assert_eq!(
        csv_files(&out),
        vec![
            PY_POST_SHRUNK_FILE,
            PY_PRE_SHRUNK_FILE,
            PY_SIZE_FACTORS_FILE,
            R_POST_SHRUNK_FILE,
            R_PRE_SHRUNK_FILE
        ]
    );
    let summary: serde_json::Value =
        serde_json::from_slice(&fs::read(out.join(SUMMARY_FILE)).expect("read summary"))
            .expect("parse summary");
    assert_eq!(summary["tool"]["name"], "deseq2-compare");
    assert_eq!(summary["pre_shrunk"]["shared_features"], 10);
}

#[test]
fn joined_tables_are_written_on_request() {
    let dir = tempdir().expect("tempdir");
    let calls = RefCell::new(Vec::new());
    let py = fake("pydeseq2", PY_FILES, 1.0, false, &calls);
    let r = fake("r-deseq2", R_FILES, 0.5, false, &calls);

    run_comparison(&request(dir.path(), true), &py, &r).expect("compare");

    assert_eq!(csv_files(dir.path()).len(), 7);
    let joined = crate::table::read_result_table(&dir.path().join(JOINED_PRE_SHRUNK_FILE));
    // Suffixed names do not satisfy the engine column check.
    assert!(joined.is_err());
    let text = fs::read_to_string(dir.path().join(JOINED_POST_SHRUNK_FILE)).expect("read");
    assert!(text.starts_with(",baseMean_py,log2FoldChange_py,padj_py,baseMean_r,"));
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn rerun_produces_identical_files() {
    let dir = tempdir().expect("tempdir");
    let calls = RefCell::new(Vec::new());
    let py = fake("pydeseq2", PY_FILES, 1.0, false, &calls);
    let r = fake("r-deseq2", R_FILES, 0.9, false, &calls);

    run_comparison(&request(dir.path(), true), &py, &r).expect("first run");
    let first_summary = fs::read(dir.path().join(SUMMARY_FILE)).expect("read");
    let first_joined = fs::read(dir.path().join(JOINED_PRE_SHRUNK_FILE)).expect("read");

    run_comparison(&request(dir.path(), true), &py, &r).expect("second run");
    assert_eq!(fs::read(dir.path().join(SUMMARY_FILE)).expect("read"), first_summary);
    assert_eq!(fs::read(dir.path().join(JOINED_PRE_SHRUNK_FILE)).expect("read"), first_joined);
}

#[test]
fn in_process_failure_skips_external_engine() {
    let dir = tempdir().expect("tempdir");
    let calls = RefCell::new(Vec::new());
    let py = fake("pydeseq2", PY_FILES, 1.0, true, &calls);
    let r = fake("r-deseq2", R_FILES, 1.0, false, &calls);

    let err = run_comparison(&request(dir.path(), false), &py, &r).unwrap_err();
    assert!(matches!(&err, CompareError::Engine { engine, .. } if engine == "pydeseq2"));
    assert_eq!(*calls.borrow(), vec!["pydeseq2"]);
    assert!(csv_files(dir.path()).is_empty());
}

#[test]
fn external_failure_leaves_no_summary() {
    let dir = tempdir().expect("tempdir");
    let calls = RefCell::new(Vec::new());
    let py = fake("pydeseq2", PY_FILES, 1.0, false, &calls);
    let r = fake("r-deseq2", R_FILES, 1.0, true, &calls);

    let err = run_comparison(&request(dir.path(), false), &py, &r).unwrap_err();
    assert!(err.to_string().starts_with("r-deseq2 failed"));
    assert!(!dir.path().join(SUMMARY_FILE).exists());
    assert_eq!(csv_files(dir.path()).len(), 3);
}

#[cfg(unix)]
#[test]
fn end_to_end_with_script_engines() {
    use crate::engine::pydeseq2::DesignSpec;
    use crate::engine::{PyDeseq2Engine, RscriptEngine};
    use crate::table::read_result_table;

    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("data");
    let out = dir.path().join("out");
    fs::create_dir_all(&data).expect("mkdir");
    let mut counts = String::from(",s1,s2,s3\n");
    for i in 0..10 {
        counts.push_str(&format!("gene{i},{},{},{}\n", 5 + i, 7 + i, 30 + i));
    }
    fs::write(data.join("counts.csv"), counts).expect("write counts");
    fs::write(
        data.join("metadata.csv"),
        ",condition\ns1,control\ns2,control\ns3,treated\n",
    )
    .expect("write metadata");

    let bridge = dir.path().join("bridge.sh");
    fs::write(
        &bridge,
        r#"features=$(head -n 1 "$1/counts.csv" | tr ',' ' ')
echo ",baseMean,log2FoldChange,lfcSE,stat,pvalue,padj" > "$1/results_pre_shrunk.csv"
echo ",baseMean,log2FoldChange,lfcSE,pvalue,padj" > "$1/results_post_shrunk.csv"
for f in $features; do
  echo "$f,14.0,1.5,0.3,5.0,1e-6,1e-5" >> "$1/results_pre_shrunk.csv"
  echo "$f,14.0,1.2,0.3,1e-6,1e-5" >> "$1/results_post_shrunk.csv"
done
printf ',size_factor\ns1,0.9\ns2,1.0\ns3,1.1\n' > "$1/size_factors.csv"
"#,
    )
    .expect("write bridge");

    let rscript = dir.path().join("deseq2.R");
    fs::write(
        &rscript,
        r#"echo '"","baseMean","log2FoldChange","lfcSE","stat","pvalue","padj"' > "$2/r_results_pre_shrunk.csv"
echo '"","baseMean","log2FoldChange","lfcSE","pvalue","padj"' > "$2/r_results_post_shrunk.csv"
tail -n +2 "$1/counts.csv" | cut -d, -f1 | while read f; do
  echo "\"$f\",14.1,1.45,0.3,4.9,2e-6,2e-5" >> "$2/r_results_pre_shrunk.csv"
  echo "\"$f\",14.1,1.1,0.3,2e-6,2e-5" >> "$2/r_results_post_shrunk.csv"
done
"#,
    )
    .expect("write rscript");

    let design = DesignSpec {
        reference_factor: "condition".to_string(),
        reference_level: "control".to_string(),
        refit_cooks: true,
    };
    let py = PyDeseq2Engine::new("sh", Some(bridge), design);
    let r = RscriptEngine::new("sh", &rscript);

    let request = CompareRequest {
        data_dir: data,
        out_dir: out.clone(),
        write_joined: false,
        config: CompareConfig::default(),
    };
    let comparison = run_comparison(&request, &py, &r).expect("compare");

    assert_eq!(csv_files(&out).len(), 5);
    let pre = read_result_table(&out.join(PY_PRE_SHRUNK_FILE)).expect("py pre");
    assert_eq!(pre.len(), 10);
    for column in [MEAN_COUNT_COLUMN, FOLD_CHANGE_COLUMN, ADJUSTED_P_COLUMN] {
        assert!(pre.has_column(column), "{column}");
    }
    assert_eq!(comparison.summary.pre_shrunk.shared_features, 10);
    let lfc = &comparison.summary.post_shrunk.columns[1];
    assert_eq!(lfc.column, FOLD_CHANGE_COLUMN);
    assert!((lfc.max_abs_diff.expect("diff") - 0.1).abs() < 1e-12);
}
