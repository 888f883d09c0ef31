use clap::Parser;

mod run;

pub use run::RunArgs;

#[derive(Parser, Debug)]
#[command(
    name = "deseq2-compare",
    version,
    about = "Fold change comparison between R DESeq2 and its pythonic counterpart pyDESeq2"
)]
pub struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

impl Cli {
    pub fn dispatch(self) -> anyhow::Result<()> {
        run::handle(self.run)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/cli/mod.rs"]
mod tests;
