pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod table;

pub mod prelude {
    pub use crate::config::CompareConfig;
    pub use crate::engine::{DeseqEngine, EngineResults, PyDeseq2Engine, RscriptEngine};
    pub use crate::pipeline::compare::{CompareRequest, Comparison, run_comparison};
    pub use crate::table::ResultTable;
}
