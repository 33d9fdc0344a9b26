use std::io;
use std::path::Path;

use flagvec_alu::{StatusFlags, Width};
use serde::{Deserialize, Serialize};

use crate::catalog::{InstrDescriptor, OuterVariant};
use crate::synth::RunOutput;

/// Flag coverage achieved by every generation run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub runs: Vec<RunCoverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCoverage {
    pub instr: String,
    pub bits: u32,
    pub variant: String,
    pub rows: usize,
    pub retries: u64,
    pub fallbacks: usize,
    pub observed_set: Vec<String>,
    pub observed_clear: Vec<String>,
    pub missing_set: Vec<String>,
    pub missing_clear: Vec<String>,
}

impl RunCoverage {
    pub fn new(
        instr: &InstrDescriptor,
        width: Width,
        variant: OuterVariant,
        out: &RunOutput,
    ) -> Self {
        let acc = &out.accumulator;
        Self {
            instr: instr.name.to_string(),
            bits: width.bits(),
            variant: variant_label(variant).to_string(),
            rows: out.rows.len(),
            retries: out.stats.retries,
            fallbacks: out.stats.fallback_slots.len(),
            observed_set: flag_names(acc.set & instr.active_flags),
            observed_clear: flag_names(acc.clear & instr.active_flags),
            missing_set: flag_names(acc.missing_set(instr.active_flags)),
            missing_clear: flag_names(acc.missing_clear(instr.active_flags)),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_set.is_empty() && self.missing_clear.is_empty()
    }

    pub fn key(&self) -> String {
        format!("{}/u{}/{}", self.instr, self.bits, self.variant)
    }
}

impl CoverageReport {
    pub fn push(&mut self, run: RunCoverage) {
        self.runs.push(run);
    }

    pub fn incomplete(&self) -> impl Iterator<Item = &RunCoverage> + '_ {
        self.runs.iter().filter(|r| !r.is_complete())
    }

    pub fn total_rows(&self) -> usize {
        self.runs.iter().map(|r| r.rows).sum()
    }

    pub fn total_fallbacks(&self) -> usize {
        self.runs.iter().map(|r| r.fallbacks).sum()
    }

    pub fn print_summary(&self) {
        eprintln!(
            "flagvec: {} runs, {} rows, {} fallbacks",
            self.runs.len(),
            self.total_rows(),
            self.total_fallbacks()
        );

        let incomplete: Vec<_> = self.incomplete().collect();
        if !incomplete.is_empty() {
            eprintln!("incomplete flag coverage:");
            for run in incomplete {
                eprintln!(
                    "  - {}: never set [{}], never clear [{}]",
                    run.key(),
                    run.missing_set.join(" "),
                    run.missing_clear.join(" ")
                );
            }
        }
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, contents)
    }
}

pub(crate) fn variant_label(variant: OuterVariant) -> &'static str {
    match variant {
        OuterVariant::Native => "native",
        OuterVariant::Imm8 => "imm8",
        OuterVariant::Imm32 => "imm32",
    }
}

fn flag_names(flags: StatusFlags) -> Vec<String> {
    flags
        .iter()
        .filter_map(StatusFlags::flag_name)
        .map(str::to_string)
        .collect()
}
