//! Layout Packer
//!
//! Greedy multi-fit bin packing over 256-bit bins:
//!
//! ```text
//!   declared order
//!     → scalars/unbounded sorted by descending width (≥256 ties), arrays appended
//!     → open bin, rescan pending list from the top, take every field that fits
//!     → close bin early once remaining capacity is exactly 0
//!     → repeat until nothing is pending
//! ```
//!
//! Every bin restarts the scan from the largest remaining field. This is
//! O(n²) and intentionally not a single-cursor first-fit-decreasing pass: the
//! two produce different orders when several same-size fields fit.

use std::cmp::Reverse;

use tracing::trace;

use super::{StorageField, WORD};

/// Anything the packer can order.
pub trait PackItem {
    /// Total bits the item occupies (0 for out-of-band items).
    fn total_bits(&self) -> u64;
    /// Declared array length (1 for scalars, 0 for unbounded).
    fn array_length(&self) -> u32;
}

impl PackItem for StorageField {
    fn total_bits(&self) -> u64 {
        self.total_bits
    }

    fn array_length(&self) -> u32 {
        self.declaration.array_length
    }
}

/// Order items for slot assignment.
pub fn pack<T: PackItem>(items: Vec<T>) -> Vec<T> {
    let mut pending = sort_for_packing(items);
    let mut packed = Vec::with_capacity(pending.len());
    let mut bin = 0usize;

    while !pending.is_empty() {
        let mut remaining = WORD;
        let mut take = vec![false; pending.len()];

        for (i, item) in pending.iter().enumerate() {
            let bits = item.total_bits();
            if bits > WORD {
                // Multi-word items only start a fresh bin.
                if remaining == WORD {
                    take[i] = true;
                    remaining = 0;
                }
            } else if bits <= remaining {
                take[i] = true;
                remaining -= bits;
            }
            if remaining == 0 {
                break;
            }
        }

        let (placed, rest): (Vec<_>, Vec<_>) =
            pending.into_iter().zip(take).partition(|(_, taken)| *taken);
        trace!(bin, placed = placed.len(), remaining, "packed bin");

        packed.extend(placed.into_iter().map(|(item, _)| item));
        pending = rest.into_iter().map(|(item, _)| item).collect();
        bin += 1;
    }

    packed
}

/// Stable sort: non-arrays by descending width with everything ≥ 256 bits
/// comparing equal, then arrays in declared order.
fn sort_for_packing<T: PackItem>(items: Vec<T>) -> Vec<T> {
    let (arrays, mut singles): (Vec<T>, Vec<T>) =
        items.into_iter().partition(|item| item.array_length() > 1);
    singles.sort_by_key(|item| Reverse(item.total_bits().min(WORD)));
    singles.extend(arrays);
    singles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: u32,
        bits: u64,
        len: u32,
    }

    impl PackItem for Item {
        fn total_bits(&self) -> u64 {
            self.bits
        }
        fn array_length(&self) -> u32 {
            self.len
        }
    }

    fn scalar(id: u32, bits: u64) -> Item {
        Item { id, bits, len: 1 }
    }

    fn array(id: u32, element_bits: u64, len: u32) -> Item {
        Item {
            id,
            bits: element_bits * u64::from(len),
            len,
        }
    }

    fn unbounded(id: u32) -> Item {
        Item { id, bits: 0, len: 0 }
    }

    fn ids(items: &[Item]) -> Vec<u32> {
        items.iter().map(|i| i.id).collect()
    }

    // ── Sorting ──────────────────────────────────────────────────────────────

    #[test]
    fn test_sort_descending_and_stable() {
        let items = vec![scalar(1, 8), scalar(2, 64), scalar(3, 8), scalar(4, 128)];
        assert_eq!(ids(&sort_for_packing(items)), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_sort_arrays_last_in_declared_order() {
        let items = vec![
            array(1, 8, 4),
            scalar(2, 1),
            array(3, 256, 2),
            unbounded(4),
            scalar(5, 160),
        ];
        assert_eq!(ids(&sort_for_packing(items)), vec![5, 2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_treats_full_words_as_equal() {
        // 256 and 512 compare equal, so declared order survives among them.
        let items = vec![scalar(1, 256), scalar(2, 64), scalar(3, 512), scalar(4, 256)];
        assert_eq!(ids(&sort_for_packing(items)), vec![1, 3, 4, 2]);
    }

    // ── Binning ──────────────────────────────────────────────────────────────

    #[test]
    fn test_pack_fills_gaps_from_the_top() {
        // 160 opens bin 0; 128 does not fit, 64 and 32 do (remaining 0 → close).
        // Bin 1 restarts from 128.
        let items = vec![
            scalar(1, 128),
            scalar(2, 160),
            scalar(3, 64),
            scalar(4, 32),
            scalar(5, 8),
        ];
        assert_eq!(ids(&pack(items)), vec![2, 3, 4, 1, 5]);
    }

    #[test]
    fn test_pack_rescans_for_every_bin() {
        // Sorted: 128a 128b 128c 64a 64b. Bin 0 takes 128a+128b and closes.
        // Bin 1 restarts at 128c, then 64a and 64b fill it.
        let items = vec![
            scalar(1, 64),
            scalar(2, 128),
            scalar(3, 128),
            scalar(4, 64),
            scalar(5, 128),
        ];
        assert_eq!(ids(&pack(items)), vec![2, 3, 5, 1, 4]);
    }

    #[test]
    fn test_pack_exact_zero_remainder_closes_bin() {
        // 192 + 64 closes bin 0 even though the zero-width item would "fit".
        let items = vec![scalar(1, 192), unbounded(2), scalar(3, 64), scalar(4, 8)];
        let packed = pack(items);
        assert_eq!(ids(&packed), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_pack_multi_word_needs_empty_bin() {
        let items = vec![scalar(1, 8), array(2, 256, 3), array(3, 8, 2)];
        // Sorted: 8, [768], [16]. Bin 0: 8, skip 768, 16. Bin 1: 768.
        assert_eq!(ids(&pack(items)), vec![1, 3, 2]);
    }

    #[test]
    fn test_pack_keeps_every_item_once() {
        let items: Vec<Item> = (0..40)
            .map(|i| match i % 5 {
                0 => scalar(i, 1),
                1 => scalar(i, 160),
                2 => array(i, 64, 3),
                3 => unbounded(i),
                _ => scalar(i, 256),
            })
            .collect();
        let mut out = ids(&pack(items.clone()));
        out.sort_unstable();
        assert_eq!(out, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_pack_empty_input() {
        assert!(pack(Vec::<Item>::new()).is_empty());
    }
}
