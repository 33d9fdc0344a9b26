use flagvec_alu::{StatusFlags, Width};
use serde::Serialize;

use crate::catalog::{InstrDescriptor, OuterVariant};

/// Set in [`TestVector::flags`] on rows produced with CF forced in.
pub const CARRY_IN_MARKER: u16 = 1 << 15;

/// One emitted row. Operands and result are zero-extended from the table width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestVector {
    pub op1: u64,
    pub op2: u64,
    pub result: u64,
    /// Status flags, plus [`CARRY_IN_MARKER`] on carry-in rows.
    pub flags: u16,
}

impl TestVector {
    pub fn new(op1: u64, op2: u64, result: u64, flags: StatusFlags) -> Self {
        Self {
            op1,
            op2,
            result,
            flags: flags.bits(),
        }
    }

    pub fn with_carry_in(op1: u64, op2: u64, result: u64, flags: StatusFlags) -> Self {
        Self {
            flags: flags.bits() | CARRY_IN_MARKER,
            ..Self::new(op1, op2, result, flags)
        }
    }

    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.flags)
    }

    pub fn carry_in(&self) -> bool {
        self.flags & CARRY_IN_MARKER != 0
    }
}

/// Rows of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSection {
    pub variant: OuterVariant,
    pub rows: Vec<TestVector>,
}

/// Every row generated for one (instruction, width) pair, one section per outer variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorTable {
    pub instr: &'static str,
    pub width: Width,
    /// Row count announced for this table, from [`table_len`].
    pub declared_len: usize,
    pub sections: Vec<TableSection>,
}

impl VectorTable {
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &TestVector> + '_ {
        self.sections.iter().flat_map(|s| s.rows.iter())
    }
}

/// Declared row count of a table. Both the declarations and the generation loop size tables with
/// this, never with the number of rows actually produced.
pub fn table_len(instr: &InstrDescriptor, width: Width, slots: usize) -> usize {
    let outer_loops = OuterVariant::variants_for(width, instr.imm_variants).len();
    slots * instr.carry_factor() * outer_loops
}
