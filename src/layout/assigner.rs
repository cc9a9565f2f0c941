//! Slot Assigner
//!
//! Single pass over the packed order. The running position is an explicit
//! [`SlotCursor`] folded across the fields rather than captured mutable state,
//! so the walk can be tested on its own.

use std::collections::BTreeMap;

use tracing::trace;

use super::{StorageField, StorageSlot, WORD};

/// Current write position: slot index plus bits already used in that slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCursor {
    pub slot: u64,
    pub offset: u32,
}

impl SlotCursor {
    /// Abandon the rest of the current slot if anything has been written to it.
    fn align_to_word(self) -> Self {
        if self.offset > 0 {
            self.next_slot()
        } else {
            self
        }
    }

    fn next_slot(self) -> Self {
        Self {
            slot: self.slot + 1,
            offset: 0,
        }
    }

    /// Position at which `field` starts, given the cursor before it.
    fn start_for(self, field: &StorageField) -> Self {
        if field.is_array() {
            self.align_to_word()
        } else if self.offset > 0 && u64::from(self.offset) + field.total_bits > WORD {
            self.next_slot()
        } else {
            self
        }
    }

    /// Cursor after a field of `total_bits` placed at `self`, spanning
    /// `consumed` slots.
    fn after(self, total_bits: u64, consumed: u64) -> Self {
        let last_slot = self.slot + consumed - 1;
        let bits_in_final = total_bits - WORD * (consumed - 1);
        // bits_in_final ≤ 256 and self.offset + bits_in_final ≤ 256 for scalars.
        let offset = u64::from(self.offset) + bits_in_final;
        if offset >= WORD {
            Self {
                slot: last_slot + 1,
                offset: (offset - WORD) as u32,
            }
        } else {
            Self {
                slot: last_slot,
                offset: offset as u32,
            }
        }
    }
}

/// Ordered record of which field ids occupy which slot.
#[derive(Debug, Default)]
pub(crate) struct SlotRegistry {
    slots: BTreeMap<u64, Vec<u32>>,
}

impl SlotRegistry {
    /// Register `id` in `consumed` consecutive slots starting at `home`.
    pub(crate) fn register(&mut self, id: u32, home: u64, consumed: u64) {
        for slot in home..home + consumed {
            self.slots.entry(slot).or_default().push(id);
        }
    }

    /// Slots in ascending index order.
    pub(crate) fn into_slots(self) -> Vec<StorageSlot> {
        self.slots
            .into_iter()
            .map(|(index, field_ids)| StorageSlot { index, field_ids })
            .collect()
    }
}

/// Assign slot and offset to every field in packed order.
pub fn assign(mut fields: Vec<StorageField>) -> (Vec<StorageField>, Vec<StorageSlot>) {
    let last_bounded = fields.iter().rposition(|f| f.total_bits > 0);
    let mut registry = SlotRegistry::default();
    let mut cursor = SlotCursor::default();

    for (i, field) in fields.iter_mut().enumerate() {
        if field.is_out_of_band() {
            field.slot = 0;
            field.offset = 0;
            trace!(id = field.id(), key = field.key(), "out-of-band field");
            continue;
        }

        let start = cursor.start_for(field);
        field.slot = start.slot;
        field.offset = start.offset;

        let consumed = field.slots_consumed();
        registry.register(field.id(), start.slot, consumed);
        trace!(
            id = field.id(),
            key = field.key(),
            slot = start.slot,
            offset = start.offset,
            consumed,
            "assigned field"
        );

        // The last physical field never opens a trailing slot.
        if last_bounded.is_some_and(|last| i < last) {
            cursor = start.after(field.total_bits, consumed);
        }
    }

    (fields, registry.into_slots())
}
