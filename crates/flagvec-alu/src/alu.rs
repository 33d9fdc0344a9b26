use crate::{StatusFlags, Width};

fn parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

fn result_flags(flags: &mut StatusFlags, result: u64, width: Width) {
    flags.set(StatusFlags::ZF, result == 0);
    flags.set(StatusFlags::SF, (result & width.sign_bit()) != 0);
    flags.set(StatusFlags::PF, parity(result as u8));
}

/// `dest - src - borrow_in`, as SUB/SBB/CMP compute it.
pub fn sub_with_flags(dest: u64, src: u64, borrow_in: bool, width: Width) -> (u64, StatusFlags) {
    let mask = width.mask();
    let dest = dest & mask;
    let src = src & mask;
    let subtrahend = (src as u128) + (borrow_in as u128);
    let result = (dest as u128).wrapping_sub(subtrahend) as u64 & mask;

    // OF and AF come from the unmodified source: folding the borrow into it first would wrap
    // when `src` is all-ones.
    let mut flags = StatusFlags::empty();
    flags.set(StatusFlags::CF, (dest as u128) < subtrahend);
    flags.set(
        StatusFlags::OF,
        ((dest ^ src) & (dest ^ result) & width.sign_bit()) != 0,
    );
    flags.set(StatusFlags::AF, ((dest ^ src ^ result) & 0x10) != 0);
    result_flags(&mut flags, result, width);

    (result, flags)
}

/// `dest + src + carry_in`, as ADD/ADC compute it.
pub fn add_with_flags(dest: u64, src: u64, carry_in: bool, width: Width) -> (u64, StatusFlags) {
    let mask = width.mask();
    let dest = dest & mask;
    let src = src & mask;
    let full = (dest as u128) + (src as u128) + (carry_in as u128);
    let result = (full as u64) & mask;

    let mut flags = StatusFlags::empty();
    flags.set(StatusFlags::CF, full > mask as u128);
    flags.set(
        StatusFlags::OF,
        ((dest ^ result) & (src ^ result) & width.sign_bit()) != 0,
    );
    flags.set(StatusFlags::AF, ((dest ^ src ^ result) & 0x10) != 0);
    result_flags(&mut flags, result, width);

    (result, flags)
}

/// Flags for AND/OR/XOR/TEST: CF and OF cleared, AF reported clear.
pub fn logic_with_flags(result: u64, width: Width) -> (u64, StatusFlags) {
    let result = width.truncate(result);
    let mut flags = StatusFlags::empty();
    result_flags(&mut flags, result, width);
    (result, flags)
}
