// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key and index types.
//!
//! Arc descriptors live in a `slotmap::SlotMap` while a topology is being
//! built, so every descriptor gets a stable [`ArcKey`] and cut chains link
//! descriptors by key. Once the topology is emitted, arcs are referenced by
//! [`ArcIndex`]: a signed position where `!i` (bitwise complement, `-i - 1`)
//! means "arc `i` traversed in reverse".

use slotmap::new_key_type;

new_key_type! {
    /// Key for an arc descriptor (a `[start, end]` range of the coordinate buffer).
    pub struct ArcKey;
}

/// Signed reference to an emitted arc.
pub type ArcIndex = i64;

/// Builds the signed index for arc `position`, reversed when `reversed` is set.
pub fn arc_index(position: usize, reversed: bool) -> ArcIndex {
    let index = position as ArcIndex;
    if reversed {
        !index
    } else {
        index
    }
}

/// Splits a signed index into the arc position and its traversal direction.
///
/// Returns `(position, reversed)`.
pub fn resolve_arc_index(index: ArcIndex) -> (usize, bool) {
    if index < 0 {
        ((!index) as usize, true)
    } else {
        (index as usize, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_convention() {
        assert_eq!(arc_index(0, true), -1);
        assert_eq!(arc_index(3, true), -4);
        assert_eq!(arc_index(3, false), 3);
    }

    #[test]
    fn resolve_reverses_complement() {
        assert_eq!(resolve_arc_index(-1), (0, true));
        assert_eq!(resolve_arc_index(-4), (3, true));
        assert_eq!(resolve_arc_index(7), (7, false));
        for position in 0..10 {
            for reversed in [false, true] {
                assert_eq!(
                    resolve_arc_index(arc_index(position, reversed)),
                    (position, reversed)
                );
            }
        }
    }
}
