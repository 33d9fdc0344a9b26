use crate::{StatusFlags, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    Bt,
    Bts,
    Btr,
    Btc,
}

/// Register form of BT/BTS/BTR/BTC: the bit offset wraps modulo the operand width.
///
/// CF receives the selected bit before modification. The remaining status flags are
/// architecturally undefined; they are reported clear so the output is reproducible.
pub fn bit_test(op: BitOp, value: u64, offset: u64, width: Width) -> (u64, StatusFlags) {
    let value = width.truncate(value);
    let bit = (offset & u64::from(width.bits() - 1)) as u32;
    let old = (value >> bit) & 1;
    let result = match op {
        BitOp::Bt => value,
        BitOp::Bts => value | (1u64 << bit),
        BitOp::Btr => value & !(1u64 << bit),
        BitOp::Btc => value ^ (1u64 << bit),
    };

    let mut flags = StatusFlags::empty();
    flags.set(StatusFlags::CF, old == 1);
    (result, flags)
}
