#![forbid(unsafe_code)]

//! Reference x86 semantics for the binary ALU and bit-test instructions.
//!
//! Every helper operates on `u64` values truncated to a [`Width`], so a single code path serves all
//! four operand sizes. The results are the architectural result plus the six status flags; flags
//! outside [`StatusFlags::STATUS`] are never produced.

mod alu;
mod bits;
mod flags;
mod mnemonic;
mod width;

pub use alu::{add_with_flags, logic_with_flags, sub_with_flags};
pub use bits::{bit_test, BitOp};
pub use flags::StatusFlags;
pub use mnemonic::{AluOutcome, Mnemonic};
pub use width::Width;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown mnemonic {0:?}")]
    UnknownMnemonic(String),

    #[error("unsupported operand width {0:?} (expected 8, 16, 32 or 64)")]
    UnsupportedWidth(String),
}
