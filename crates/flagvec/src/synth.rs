//! The per-run sample/validate/accept loop.

use flagvec_alu::{StatusFlags, Width};
use rand::Rng;

use crate::catalog::{InstrDescriptor, OuterVariant};
use crate::oracle::{Oracle, OracleRegistry};
use crate::plan::{plan, FlagAccumulator, FlagConstraint};
use crate::report::{CoverageReport, RunCoverage};
use crate::sample::{sample, OperandRole};
use crate::table::{table_len, TableSection, TestVector, VectorTable};
use crate::GenConfig;

/// Attempts per slot before the last draw is kept regardless of the constraint.
pub const DEFAULT_RETRY_CEILING: u32 = 1 << 20;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Rejected draws across all slots.
    pub retries: u64,
    /// Slots whose constraint was still unmet at the retry ceiling.
    pub fallback_slots: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rows: Vec<TestVector>,
    pub accumulator: FlagAccumulator,
    pub stats: RunStats,
}

pub struct Synthesizer<'r, R: ?Sized> {
    rng: &'r mut R,
    retry_ceiling: u32,
}

impl<'r, R: Rng + ?Sized> Synthesizer<'r, R> {
    pub fn new(rng: &'r mut R, retry_ceiling: u32) -> Self {
        Self { rng, retry_ceiling }
    }

    /// Generates `slots` slots for one (instruction, width, variant) run.
    pub fn run(
        &mut self,
        instr: &InstrDescriptor,
        width: Width,
        variant: OuterVariant,
        slots: usize,
        oracle: &dyn Oracle,
    ) -> RunOutput {
        let mut accumulator = FlagAccumulator::default();
        let mut rows = Vec::with_capacity(slots * instr.carry_factor());
        let mut stats = RunStats::default();

        for slot in 0..slots {
            let constraint = plan(
                slot,
                slots,
                instr.active_flag_count(),
                instr.active_flags,
                &accumulator,
            );

            let (op1, op2, result, flags) =
                self.draw(width, variant, slot, &constraint, oracle, &mut stats);
            accumulator.observe(flags);
            rows.push(TestVector::new(op1, op2, result, flags));

            if instr.carry_in {
                let (result, flags) = eval_masked(oracle, width, op1, op2, true);
                accumulator.observe(flags);
                rows.push(TestVector::with_carry_in(op1, op2, result, flags));
            }
        }

        RunOutput {
            rows,
            accumulator,
            stats,
        }
    }

    fn draw(
        &mut self,
        width: Width,
        variant: OuterVariant,
        slot: usize,
        constraint: &FlagConstraint,
        oracle: &dyn Oracle,
        stats: &mut RunStats,
    ) -> (u64, u64, u64, StatusFlags) {
        let mut attempt = 0u32;
        loop {
            let index = slot + attempt as usize;
            let op1 = sample(
                &mut *self.rng,
                width,
                index,
                OperandRole::First,
                OuterVariant::Native,
            );
            let op2 = sample(&mut *self.rng, width, index, OperandRole::Second, variant);
            let (result, flags) = eval_masked(oracle, width, op1, op2, false);

            if !constraint.rejects(flags) {
                return (op1, op2, result, flags);
            }
            if attempt >= self.retry_ceiling {
                tracing::debug!(
                    %width,
                    slot,
                    must_be_set = ?constraint.must_be_set,
                    must_be_clear = ?constraint.must_be_clear,
                    "flag constraint unmet after {attempt} retries; keeping last draw"
                );
                stats.fallback_slots.push(slot);
                return (op1, op2, result, flags);
            }

            attempt += 1;
            stats.retries += 1;
        }
    }

    /// Generates the full table for one (instruction, width): one run per outer variant.
    pub fn table(
        &mut self,
        instr: &InstrDescriptor,
        width: Width,
        slots: usize,
        oracle: &dyn Oracle,
        report: &mut CoverageReport,
    ) -> VectorTable {
        let variants = OuterVariant::variants_for(width, instr.imm_variants);
        let mut sections = Vec::with_capacity(variants.len());
        for &variant in variants {
            let out = self.run(instr, width, variant, slots, oracle);
            report.push(RunCoverage::new(instr, width, variant, &out));
            sections.push(TableSection {
                variant,
                rows: out.rows,
            });
        }

        let table = VectorTable {
            instr: instr.name,
            width,
            declared_len: table_len(instr, width, slots),
            sections,
        };
        debug_assert_eq!(table.len(), table.declared_len);
        table
    }
}

/// Invokes the oracle and drops anything outside the width and the status flags.
fn eval_masked(
    oracle: &dyn Oracle,
    width: Width,
    op1: u64,
    op2: u64,
    carry_in: bool,
) -> (u64, StatusFlags) {
    let (result, flags) = oracle.eval(op1, op2, carry_in);
    (width.truncate(result), flags & StatusFlags::STATUS)
}

/// Generates every selected (instruction, width) table in catalog order.
///
/// Widths without a registered oracle are skipped.
pub fn synthesize_all<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GenConfig,
    catalog: &[InstrDescriptor],
    registry: &OracleRegistry,
) -> (Vec<VectorTable>, CoverageReport) {
    let mut synth = Synthesizer::new(rng, config.retry_ceiling);
    let mut report = CoverageReport::default();
    let mut tables = Vec::new();

    for instr in catalog.iter().filter(|i| config.selects(i.name)) {
        for &width in instr.widths {
            let Some(oracle) = registry.get(instr.name, width) else {
                tracing::warn!(instr = instr.name, %width, "no oracle registered; skipping table");
                continue;
            };
            let slots = config.slots.for_width(width);
            tracing::debug!(
                instr = instr.name,
                %width,
                rows = table_len(instr, width, slots),
                "generating table"
            );
            tables.push(synth.table(instr, width, slots, oracle, &mut report));
        }
    }

    (tables, report)
}
