//! Reference implementations the synthesizer treats as black boxes.

use std::collections::BTreeMap;
use std::fmt;

use flagvec_alu::{Mnemonic, StatusFlags, Width};

/// Pure `(op1, op2, carry_in) -> (result, flags)` for one instruction at one width.
///
/// Operands are passed zero-extended to `u64`; the returned result must already be truncated to
/// the width. Flags may carry stray bits; callers mask them to [`StatusFlags::STATUS`].
pub trait Oracle {
    fn eval(&self, op1: u64, op2: u64, carry_in: bool) -> (u64, StatusFlags);
}

impl<F> Oracle for F
where
    F: Fn(u64, u64, bool) -> (u64, StatusFlags),
{
    fn eval(&self, op1: u64, op2: u64, carry_in: bool) -> (u64, StatusFlags) {
        self(op1, op2, carry_in)
    }
}

/// Maps `(instruction name, width)` to its oracle. A missing entry means that width is not
/// generated for the instruction.
#[derive(Default)]
pub struct OracleRegistry {
    oracles: BTreeMap<(String, Width), Box<dyn Oracle>>,
}

impl fmt::Debug for OracleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.oracles.keys()).finish()
    }
}

impl OracleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry backed by the `flagvec-alu` reference semantics for every encodable pair.
    pub fn x86() -> Self {
        let mut registry = Self::new();
        for mnemonic in Mnemonic::ALL {
            for width in Width::ALL {
                if !mnemonic.supports(width) {
                    continue;
                }
                registry.insert(
                    mnemonic.name(),
                    width,
                    move |op1: u64, op2: u64, carry_in: bool| {
                        mnemonic
                            .execute(width, op1, op2, carry_in)
                            .map(|out| (out.result, out.flags))
                            .unwrap_or((0, StatusFlags::empty()))
                    },
                );
            }
        }
        registry
    }

    pub fn insert(&mut self, name: &str, width: Width, oracle: impl Oracle + 'static) {
        self.oracles
            .insert((name.to_string(), width), Box::new(oracle));
    }

    pub fn remove(&mut self, name: &str, width: Width) -> bool {
        self.oracles.remove(&(name.to_string(), width)).is_some()
    }

    pub fn get(&self, name: &str, width: Width) -> Option<&dyn Oracle> {
        self.oracles
            .get(&(name.to_string(), width))
            .map(|oracle| oracle.as_ref())
    }

    /// Widths registered for `name`, narrowest first.
    pub fn widths_for(&self, name: &str) -> Vec<Width> {
        self.oracles
            .keys()
            .filter(|(n, _)| n == name)
            .map(|&(_, width)| width)
            .collect()
    }
}
