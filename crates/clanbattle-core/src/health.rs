// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size boss health vector keyed by [`BossSlot`].

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::types::{BossSlot, SLOT_COUNT};

/// Remaining health of each of the five bosses in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BossHealth(pub [u64; SLOT_COUNT]);

impl BossHealth {
    pub const ZERO: BossHealth = BossHealth([0; SLOT_COUNT]);

    pub fn new(values: [u64; SLOT_COUNT]) -> Self {
        Self(values)
    }

    /// True once every boss of the cycle has been defeated.
    pub fn all_cleared(&self) -> bool {
        self.0.iter().all(|h| *h == 0)
    }

    /// Iterate `(slot, health)` pairs in fight order.
    pub fn iter(&self) -> impl Iterator<Item = (BossSlot, u64)> + '_ {
        BossSlot::ALL.into_iter().map(|slot| (slot, self[slot]))
    }
}

impl Index<BossSlot> for BossHealth {
    type Output = u64;

    fn index(&self, slot: BossSlot) -> &u64 {
        &self.0[slot.index()]
    }
}

impl IndexMut<BossSlot> for BossHealth {
    fn index_mut(&mut self, slot: BossSlot) -> &mut u64 {
        &mut self.0[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn index_by_slot() {
        let mut h = BossHealth::new([10, 20, 30, 40, 50]);
        let s3 = BossSlot::new(3).unwrap();
        assert_eq!(h[s3], 30);
        h[s3] = 0;
        assert_eq!(h.0, [10, 20, 0, 40, 50]);
        assert!(!h.all_cleared());
        assert!(BossHealth::ZERO.all_cleared());
    }

    #[test]
    fn iter_yields_fight_order() {
        let h = BossHealth::new([1, 2, 3, 4, 5]);
        let slots: Vec<u8> = h.iter().map(|(s, _)| s.number()).collect();
        assert_eq!(slots, vec![1, 2, 3, 4, 5]);
    }

    proptest! {
        #[test]
        fn iter_agrees_with_indexing(values in any::<[u64; SLOT_COUNT]>(), n in 1u8..=5) {
            let h = BossHealth::new(values);
            let slot = BossSlot::new(n).unwrap();
            let from_iter = h.iter().find(|(s, _)| *s == slot).map(|(_, v)| v);
            prop_assert_eq!(from_iter, Some(h[slot]));
            prop_assert_eq!(h[slot], values[usize::from(n) - 1]);
        }

        #[test]
        fn cleared_only_when_every_slot_is_zero(values in any::<[u64; SLOT_COUNT]>()) {
            let h = BossHealth::new(values);
            prop_assert_eq!(h.all_cleared(), h.iter().all(|(_, v)| v == 0));
        }
    }
}
