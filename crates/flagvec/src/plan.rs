//! Flag coverage planning.
//!
//! Random operands rarely hit some flag states (OF, or ZF at 64 bits). The planner steers the
//! tail of every run: walking the active flags from the lowest bit, each flag consumes two of the
//! remaining slots. An odd remainder demands the selected flag set and an even one demands it
//! clear, so in slot order each flag is first shown set and then clear. The lowest flag only gets
//! the final, set-demanding slot; a remainder of exactly `2 * active_flag_count` walks past the
//! last flag and demands nothing. Demands already met earlier in the run are dropped.

use flagvec_alu::StatusFlags;

/// Status flags seen set and seen clear so far within one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlagAccumulator {
    pub set: StatusFlags,
    pub clear: StatusFlags,
}

impl FlagAccumulator {
    pub fn observe(&mut self, flags: StatusFlags) {
        let flags = flags & StatusFlags::STATUS;
        self.set |= flags;
        self.clear |= !flags;
    }

    /// Active flags not yet seen set.
    pub fn missing_set(&self, active: StatusFlags) -> StatusFlags {
        active - self.set
    }

    /// Active flags not yet seen clear.
    pub fn missing_clear(&self, active: StatusFlags) -> StatusFlags {
        active - self.clear
    }
}

/// Per-slot demand on the oracle's flag output. At most one flag is named, in one polarity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlagConstraint {
    pub must_be_set: StatusFlags,
    pub must_be_clear: StatusFlags,
}

impl FlagConstraint {
    pub const NONE: Self = Self {
        must_be_set: StatusFlags::empty(),
        must_be_clear: StatusFlags::empty(),
    };

    pub fn is_none(&self) -> bool {
        self.must_be_set.is_empty() && self.must_be_clear.is_empty()
    }

    pub fn rejects(&self, flags: StatusFlags) -> bool {
        flags.intersects(self.must_be_clear) || !flags.contains(self.must_be_set)
    }
}

pub fn plan(
    slot: usize,
    total_slots: usize,
    active_flag_count: u32,
    active_flags: StatusFlags,
    observed: &FlagAccumulator,
) -> FlagConstraint {
    let remaining = total_slots.saturating_sub(slot);
    if remaining == 0 || remaining > active_flag_count as usize * 2 {
        return FlagConstraint::NONE;
    }

    let Some(flag) = active_flags.iter().nth(remaining / 2) else {
        return FlagConstraint::NONE;
    };

    if remaining % 2 == 1 {
        if !observed.set.contains(flag) {
            return FlagConstraint {
                must_be_set: flag,
                ..FlagConstraint::NONE
            };
        }
    } else if !observed.clear.contains(flag) {
        return FlagConstraint {
            must_be_clear: flag,
            ..FlagConstraint::NONE
        };
    }

    FlagConstraint::NONE
}
