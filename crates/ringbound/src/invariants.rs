//! Debug assertion macros for ring buffer invariants.
//!
//! They are only active in debug builds (`debug_assert!`), so there is zero
//! overhead in release builds. Every macro is evaluated while the buffer lock
//! is held.

// =============================================================================
// Bounded Count
// =============================================================================

/// Assert that occupancy never exceeds capacity.
///
/// **Invariant**: `0 ≤ count ≤ capacity` (the lower bound is the type's)
///
/// Used in: `push_slot()` after incrementing count
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "bounded count violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Ring Consistency
// =============================================================================

/// Assert that tail is exactly `count` slots ahead of head.
///
/// **Invariant**: `tail == (head + count) mod capacity`
///
/// Used in: `push_slot()` and `pop_slot()` after updating indices
macro_rules! debug_assert_ring_consistent {
    ($head:expr, $tail:expr, $count:expr, $capacity:expr) => {
        debug_assert!(
            $tail == ($head + $count) % $capacity,
            "ring consistency violated: tail {} != (head {} + count {}) % {}",
            $tail,
            $head,
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Slot Occupancy
// =============================================================================

/// Assert that a write targets an empty slot.
///
/// **Invariant**: slots outside `[head, head + count)` hold no element
///
/// Used in: `push_slot()` before storing
macro_rules! debug_assert_slot_vacant {
    ($slot:expr, $idx:expr) => {
        debug_assert!(
            $slot.is_none(),
            "slot occupancy violated: overwriting live slot {}",
            $idx
        )
    };
}

/// Assert that a read found a live element.
///
/// Used in: `pop_slot()` after taking the slot
macro_rules! debug_assert_slot_live {
    ($item:expr, $idx:expr) => {
        debug_assert!(
            $item.is_some(),
            "slot occupancy violated: reading empty slot {}",
            $idx
        )
    };
}

// =============================================================================
// Monotonic Close
// =============================================================================

/// Assert that `closed` never reverts to false.
///
/// Used in: `close()` after setting the flag
macro_rules! debug_assert_closed_monotonic {
    ($was_closed:expr, $now_closed:expr) => {
        debug_assert!(
            !$was_closed || $now_closed,
            "monotonic close violated: buffer reopened"
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_closed_monotonic;
pub(crate) use debug_assert_ring_consistent;
pub(crate) use debug_assert_slot_live;
pub(crate) use debug_assert_slot_vacant;
