//! Operand sampling with boundary injection.

use flagvec_alu::Width;
use rand::Rng;

use crate::catalog::OuterVariant;

/// Upper bound for the random right shift applied to magnitude-limited imm32 operands.
const IMM32_SHIFT_MAX: u32 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRole {
    First,
    Second,
}

/// Draws one operand for entropy index `index` of a run.
///
/// Indices 0, 1 and 2 always yield boundary values (zero, all-ones, and an all-ones/zero pair),
/// so every table starts with the identities of the instruction. Later indices are random, with
/// every third draw shifted right to favour small magnitudes.
pub fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    width: Width,
    index: usize,
    role: OperandRole,
    variant: OuterVariant,
) -> u64 {
    if width == Width::W64 && variant != OuterVariant::Native {
        return sample_imm64(rng, index, variant);
    }

    match index {
        0 => return 0,
        1 => return width.mask(),
        2 => {
            return match role {
                OperandRole::First => width.mask(),
                OperandRole::Second => 0,
            }
        }
        _ => {}
    }

    // An imm32 below 64 bits is as wide as the register, so only imm8 narrows here.
    if variant == OuterVariant::Imm8 && width != Width::W8 {
        let narrow = sample(rng, Width::W8, index, role, OuterVariant::Native);
        return width.sign_extend_from(narrow, Width::W8);
    }

    if index % 3 == 0 {
        let shift = rng.gen_range(1..=width.bits() - 1);
        rng.gen_range(0..=width.mask() >> shift)
    } else {
        rng.gen_range(0..=width.mask())
    }
}

fn sample_imm64<R: Rng + ?Sized>(rng: &mut R, index: usize, variant: OuterVariant) -> u64 {
    if variant == OuterVariant::Imm8 {
        return Width::W64.sign_extend_from(u64::from(rng.gen::<u8>()), Width::W8);
    }

    if index % 2 != 0 {
        return Width::W64.sign_extend_from(u64::from(rng.gen::<u32>()), Width::W32);
    }

    let shift = rng.gen_range(1..=IMM32_SHIFT_MAX);
    // The shift is at least one, so the draw fits in a non-negative i32.
    let mut imm = rng.gen_range(0..=u32::MAX >> shift) as i32;
    if rng.gen_bool(0.5) {
        imm = imm.wrapping_neg();
    }
    i64::from(imm) as u64
}
