#![forbid(unsafe_code)]

//! Test-vector synthesis for binary x86 instructions.
//!
//! For every (instruction, width) pair the generator produces a fixed-size table of
//! `(op1, op2, result, flags)` rows computed by a reference [`Oracle`]. Rows are random apart from
//! a few boundary values at the start of each run, and the last slots of every run are steered
//! by the flag coverage planner ([`plan`]) so each active status flag shows up both set and
//! clear.
//!
//! Table sizes never depend on the random draws: see [`table_len`].

pub mod catalog;
pub mod config;
pub mod emit;
pub mod error;
pub mod oracle;
pub mod plan;
pub mod report;
pub mod sample;
pub mod synth;
pub mod table;

pub use catalog::{x86_catalog, InstrDescriptor, OuterVariant};
pub use config::{GenConfig, SlotCounts};
pub use error::ConfigError;
pub use oracle::{Oracle, OracleRegistry};
pub use plan::{plan, FlagAccumulator, FlagConstraint};
pub use report::{CoverageReport, RunCoverage};
pub use sample::{sample, OperandRole};
pub use synth::{synthesize_all, RunOutput, RunStats, Synthesizer, DEFAULT_RETRY_CEILING};
pub use table::{table_len, TableSection, TestVector, VectorTable, CARRY_IN_MARKER};

pub use flagvec_alu::{StatusFlags, Width};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Everything one generator invocation produced.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub seed: u64,
    pub tables: Vec<VectorTable>,
    pub report: CoverageReport,
}

/// Validates `config` and generates every selected table.
pub fn generate(
    config: &GenConfig,
    catalog: &[InstrDescriptor],
    registry: &OracleRegistry,
) -> Result<Synthesis, ConfigError> {
    config.validate(catalog)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let (tables, report) = synthesize_all(&mut rng, config, catalog, registry);
    tracing::info!(
        seed = config.seed,
        tables = tables.len(),
        rows = report.total_rows(),
        fallbacks = report.total_fallbacks(),
        "generated test vectors"
    );

    Ok(Synthesis {
        seed: config.seed,
        tables,
        report,
    })
}

/// [`generate`] over the built-in x86 catalog and reference oracles.
pub fn generate_x86(config: &GenConfig) -> Result<Synthesis, ConfigError> {
    generate(config, &x86_catalog(), &OracleRegistry::x86())
}
