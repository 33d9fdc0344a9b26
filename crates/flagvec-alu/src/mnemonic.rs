use std::fmt;
use std::str::FromStr;

use crate::alu::{add_with_flags, logic_with_flags, sub_with_flags};
use crate::bits::{bit_test, BitOp};
use crate::{ParseError, StatusFlags, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mnemonic {
    And,
    Or,
    Xor,
    Test,
    Add,
    Adc,
    Sub,
    Sbb,
    Cmp,
    Bt,
    Btc,
    Btr,
    Bts,
}

/// Result of executing one instruction on a pair of operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutcome {
    /// Destination value after the instruction. TEST, CMP and BT leave it equal to the first
    /// operand.
    pub result: u64,
    pub flags: StatusFlags,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 13] = [
        Mnemonic::And,
        Mnemonic::Or,
        Mnemonic::Xor,
        Mnemonic::Test,
        Mnemonic::Add,
        Mnemonic::Adc,
        Mnemonic::Sub,
        Mnemonic::Sbb,
        Mnemonic::Cmp,
        Mnemonic::Bt,
        Mnemonic::Btc,
        Mnemonic::Btr,
        Mnemonic::Bts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mnemonic::And => "and",
            Mnemonic::Or => "or",
            Mnemonic::Xor => "xor",
            Mnemonic::Test => "test",
            Mnemonic::Add => "add",
            Mnemonic::Adc => "adc",
            Mnemonic::Sub => "sub",
            Mnemonic::Sbb => "sbb",
            Mnemonic::Cmp => "cmp",
            Mnemonic::Bt => "bt",
            Mnemonic::Btc => "btc",
            Mnemonic::Btr => "btr",
            Mnemonic::Bts => "bts",
        }
    }

    fn bit_op(self) -> Option<BitOp> {
        match self {
            Mnemonic::Bt => Some(BitOp::Bt),
            Mnemonic::Btc => Some(BitOp::Btc),
            Mnemonic::Btr => Some(BitOp::Btr),
            Mnemonic::Bts => Some(BitOp::Bts),
            _ => None,
        }
    }

    /// Bit tests have no 8-bit encoding.
    pub fn supports(self, width: Width) -> bool {
        !(self.bit_op().is_some() && width == Width::W8)
    }

    /// Executes `op1 <op> op2` at `width`; `None` for an encoding that does not exist.
    pub fn execute(self, width: Width, op1: u64, op2: u64, carry_in: bool) -> Option<AluOutcome> {
        if !self.supports(width) {
            return None;
        }
        let op1 = width.truncate(op1);
        let op2 = width.truncate(op2);

        let (result, flags) = match self {
            Mnemonic::And => logic_with_flags(op1 & op2, width),
            Mnemonic::Or => logic_with_flags(op1 | op2, width),
            Mnemonic::Xor => logic_with_flags(op1 ^ op2, width),
            Mnemonic::Test => (op1, logic_with_flags(op1 & op2, width).1),
            Mnemonic::Add => add_with_flags(op1, op2, false, width),
            Mnemonic::Adc => add_with_flags(op1, op2, carry_in, width),
            Mnemonic::Sub => sub_with_flags(op1, op2, false, width),
            Mnemonic::Sbb => sub_with_flags(op1, op2, carry_in, width),
            Mnemonic::Cmp => (op1, sub_with_flags(op1, op2, false, width).1),
            Mnemonic::Bt | Mnemonic::Btc | Mnemonic::Btr | Mnemonic::Bts => {
                let op = self.bit_op()?;
                bit_test(op, op1, op2, width)
            }
        };

        Some(AluOutcome { result, flags })
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mnemonic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Mnemonic::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| ParseError::UnknownMnemonic(s.to_string()))
    }
}
