use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::load_config;
use crate::engine::{PyDeseq2Engine, RscriptEngine};
use crate::pipeline::compare::{CompareRequest, run_comparison};
use crate::report::text::render_summary;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input directory; must contain counts.csv and metadata.csv
    #[arg(long = "data_directory_path", value_name = "DIR")]
    pub(crate) data_directory_path: PathBuf,

    /// Output directory, created if it does not exist
    #[arg(long = "output_directory_path", value_name = "DIR")]
    pub(crate) output_directory_path: PathBuf,

    /// Path to the R DESeq2 script
    #[arg(long = "deseq2_rscript_path", value_name = "PATH", default_value = "deseq2.R")]
    pub(crate) deseq2_rscript_path: PathBuf,

    /// Optional TOML file overriding interpreters, reference level and suffixes
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Also write the joined pre/post shrinkage tables
    #[arg(long = "write_joined_tables")]
    pub(crate) write_joined_tables: bool,
}

pub fn handle(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).context("loading config")?;
    info!(
        data = %args.data_directory_path.display(),
        out = %args.output_directory_path.display(),
        rscript = %args.deseq2_rscript_path.display(),
        "starting comparison"
    );

    let in_process = PyDeseq2Engine::from_config(&config);
    let external = RscriptEngine::from_config(&config, &args.deseq2_rscript_path);
    let request = CompareRequest {
        data_dir: args.data_directory_path,
        out_dir: args.output_directory_path,
        write_joined: args.write_joined_tables,
        config,
    };

    let comparison = run_comparison(&request, &in_process, &external)?;
    print!("{}", render_summary(&comparison.summary));
    Ok(())
}
