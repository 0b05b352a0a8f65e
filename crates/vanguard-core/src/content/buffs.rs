//! Stock buff applications.
//!
//! Durations count the holder's own turn ends, so a buff applied during its
//! holder's turn with duration 2 is still there on the holder's next turn.

use crate::buff::Buff;

/// How long a Combo marker lingers on its target.
pub const COMBO_DURATION: i32 = 2;

/// One evasion charge.
#[must_use]
pub const fn dodge() -> Buff {
    Buff::dodge(1, 3)
}

/// One empowered attack.
#[must_use]
pub const fn strength() -> Buff {
    Buff::strength(1, 2)
}

/// The combo marker left by setup attacks.
#[must_use]
pub const fn combo() -> Buff {
    Buff::combo(COMBO_DURATION)
}

/// Halves the next hit taken within three turns. Each application blocks
/// once; the stack only weighs it against other applications.
#[must_use]
pub fn block() -> Buff {
    Buff::block(3, 3)
}

/// A short burst of speed.
#[must_use]
pub const fn haste() -> Buff {
    Buff::haste(1, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baton::Baton;
    use crate::factor::Factor;
    use crate::timing::Timing;

    #[test]
    fn test_stock_buffs_are_live() {
        for buff in [dodge(), strength(), combo(), block(), haste()] {
            assert!(!buff.expired(), "{} starts expired", buff.name_str());
        }
    }

    #[test]
    fn test_block_stops_one_hit_per_application() {
        let mut block = block();
        block.absorb(super::block());
        // two applications, two blocked hits
        for _ in 0..2 {
            assert!(!block.expired());
            block.after_affect(Timing::DEFEND, &Baton::new());
        }
        assert!(block.expired());
    }

    #[test]
    fn test_block_is_independent() {
        let mut block = block();
        block.absorb(super::block());
        assert_eq!(block.stack(), 6);
        assert_eq!(block.duration(), 3);
    }
}
