//! Generator configuration.
//!
//! ## Environment variables
//!
//! [`GenConfig::from_env`] recognises:
//!
//! - `FLAGVEC_SLOTS_U8`, `FLAGVEC_SLOTS_U16`, `FLAGVEC_SLOTS_U32` (default: `48`) and
//!   `FLAGVEC_SLOTS_U64` (default: `64`): slots per generation run at each width.
//! - `FLAGVEC_SEED` (default: `0x9e37_79b9_7f4a_7c15`): RNG seed; decimal or `0x` hex, `_`
//!   separators allowed.
//! - `FLAGVEC_RETRY_CEILING` (default: `1048576`): attempts per slot before a flag constraint is
//!   given up on.
//! - `FLAGVEC_FILTER` (optional): comma/space separated instruction names to generate.

use flagvec_alu::Width;

use crate::catalog::InstrDescriptor;
use crate::error::ConfigError;
use crate::synth::DEFAULT_RETRY_CEILING;

pub const DEFAULT_SEED: u64 = 0x_9e37_79b9_7f4a_7c15;

/// Slots per generation run, by operand width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCounts {
    pub u8: usize,
    pub u16: usize,
    pub u32: usize,
    pub u64: usize,
}

impl Default for SlotCounts {
    fn default() -> Self {
        Self {
            u8: 48,
            u16: 48,
            u32: 48,
            u64: 64,
        }
    }
}

impl SlotCounts {
    pub fn for_width(&self, width: Width) -> usize {
        match width {
            Width::W8 => self.u8,
            Width::W16 => self.u16,
            Width::W32 => self.u32,
            Width::W64 => self.u64,
        }
    }

    pub fn set(&mut self, width: Width, slots: usize) {
        match width {
            Width::W8 => self.u8 = slots,
            Width::W16 => self.u16 = slots,
            Width::W32 => self.u32 = slots,
            Width::W64 => self.u64 = slots,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    pub slots: SlotCounts,
    pub seed: u64,
    pub retry_ceiling: u32,
    /// Lower-case instruction names to generate; empty selects everything.
    pub filter: Vec<String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            slots: SlotCounts::default(),
            seed: DEFAULT_SEED,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            filter: Vec::new(),
        }
    }
}

impl GenConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source; unset or blank variables keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (var, width) in [
            ("FLAGVEC_SLOTS_U8", Width::W8),
            ("FLAGVEC_SLOTS_U16", Width::W16),
            ("FLAGVEC_SLOTS_U32", Width::W32),
            ("FLAGVEC_SLOTS_U64", Width::W64),
        ] {
            if let Some(value) = non_blank(lookup(var)) {
                let slots = parse_number(&value)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or(ConfigError::InvalidEnv {
                        var,
                        value,
                        expected: "slot count",
                    })?;
                config.slots.set(width, slots);
            }
        }

        if let Some(value) = non_blank(lookup("FLAGVEC_SEED")) {
            config.seed = parse_number(&value).ok_or(ConfigError::InvalidEnv {
                var: "FLAGVEC_SEED",
                value,
                expected: "seed",
            })?;
        }

        if let Some(value) = non_blank(lookup("FLAGVEC_RETRY_CEILING")) {
            config.retry_ceiling = parse_number(&value)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or(ConfigError::InvalidEnv {
                    var: "FLAGVEC_RETRY_CEILING",
                    value,
                    expected: "retry ceiling",
                })?;
        }

        if let Some(value) = non_blank(lookup("FLAGVEC_FILTER")) {
            config.filter = parse_filter_terms(&value);
        }

        Ok(config)
    }

    /// Rejects configurations that cannot produce the declared tables.
    pub fn validate(&self, catalog: &[InstrDescriptor]) -> Result<(), ConfigError> {
        for width in Width::ALL {
            if self.slots.for_width(width) == 0 {
                return Err(ConfigError::ZeroSlots { bits: width.bits() });
            }
        }
        if self.retry_ceiling == 0 {
            return Err(ConfigError::ZeroRetryCeiling);
        }
        for term in &self.filter {
            if !catalog.iter().any(|i| i.name == term) {
                let known = catalog.iter().map(|i| i.name).collect::<Vec<_>>().join(", ");
                return Err(ConfigError::UnknownInstruction {
                    name: term.clone(),
                    known,
                });
            }
        }
        Ok(())
    }

    pub fn selects(&self, name: &str) -> bool {
        self.filter.is_empty() || self.filter.iter().any(|term| term == name)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses decimal or `0x` hex, allowing `_` separators so in-code constants can be pasted.
pub fn parse_number(input: &str) -> Option<u64> {
    let cleaned: String = input.trim().chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.as_str();
    let (radix, digits) = match cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        Some(rest) => (16, rest),
        None => (10, cleaned),
    };
    if digits.is_empty() {
        return None;
    }

    u64::from_str_radix(digits, radix).ok()
}

pub fn parse_filter_terms(filter: &str) -> Vec<String> {
    filter
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
        .collect()
}
