//! The field-packing skeleton shared by every runtime generation.
//!
//! All generations lay an instance out the same way: start at the object header, walk the
//! base-class chain from the root down, sort each class's surviving fields by descending
//! width, and advance a running size while placing them. The generations differ only in the
//! two decision points supplied by [`LayoutRules`]: the boundary a finished field block is
//! advanced to, and whether the sub-8-byte gap in front of a block may be filled with the
//! block's own smaller fields.
//!
//! Gap accounting works on explicit slots. When the gap hook fires, the bytes up to the next
//! 8-byte boundary become a slot; every field first tries the lowest recorded slot it fits
//! into (respecting its natural alignment) before growing the running size. Under
//! [`RuntimeGeneration::Post15Default`](crate::RuntimeGeneration::Post15Default) the slots -
//! including every hole left by per-field and block-tail rounding - survive the block that
//! created them and remain available to every later class in the chain; the other
//! generations drop them at the block boundary, so only the class that created a gap may
//! fill it.

use crate::layout::{
    contention::ContentionPolicy,
    generation::LayoutRules,
    inventory::ClassInventory,
    round_to,
    runtime::RuntimeLayout,
};
use crate::RuntimeGeneration;

/// An unoccupied byte range behind the running size
#[derive(Debug, Clone, Copy)]
struct Slot {
    offset: u64,
    length: u64,
}

impl Slot {
    fn new(offset: u64, length: u64) -> Self {
        Slot { offset, length }
    }

    fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Places a field of the given width into the lowest fitting slot, splitting off whatever
/// the placement does not consume; returns the chosen offset
fn place_in_slots(slots: &mut Vec<Slot>, width: u64) -> Option<u64> {
    for index in 0..slots.len() {
        let slot = slots[index];
        let start = round_to(slot.offset, width);
        if start + width > slot.end() {
            continue;
        }

        slots.remove(index);
        let mut insert_at = index;
        if start > slot.offset {
            slots.insert(insert_at, Slot::new(slot.offset, start - slot.offset));
            insert_at += 1;
        }
        if start + width < slot.end() {
            slots.insert(insert_at, Slot::new(start + width, slot.end() - (start + width)));
        }
        return Some(start);
    }
    None
}

/// A bound, immutable layout strategy: runtime description, generation rules, and contention
/// policy frozen at construction. Stateless beyond its configuration and safe to share.
#[derive(Debug, Clone)]
pub(crate) struct LayoutStrategy {
    layout: RuntimeLayout,
    rules: LayoutRules,
    policy: ContentionPolicy,
}

impl LayoutStrategy {
    pub(crate) fn new(
        layout: RuntimeLayout,
        generation: RuntimeGeneration,
        policy: ContentionPolicy,
    ) -> Self {
        LayoutStrategy {
            layout,
            rules: generation.rules(),
            policy,
        }
    }

    pub(crate) fn layout(&self) -> &RuntimeLayout {
        &self.layout
    }

    pub(crate) fn policy(&self) -> &ContentionPolicy {
        &self.policy
    }

    /// Shallow size of a scalar instance described by the inventory
    pub(crate) fn instance_size(&self, inventory: &ClassInventory) -> u64 {
        let reuse = self.rules.reuses_empty_slots();
        let mut size = u64::from(self.layout.object_header_size());
        let mut carried: Vec<Slot> = Vec::new();

        for class in inventory.chain() {
            if class.fields().is_empty() {
                continue;
            }

            let mut widths: Vec<u64> = class
                .fields()
                .iter()
                .map(|field| u64::from(self.layout.storage_size(field.storage())))
                .collect();
            // Stable sort: equal widths keep declaration order.
            widths.sort_by(|a, b| b.cmp(a));

            let declared: u64 = widths.iter().sum();
            let by_8: u64 = widths.iter().filter(|width| **width == 8).sum();

            let mut slots = if reuse {
                std::mem::take(&mut carried)
            } else {
                Vec::new()
            };

            if self
                .rules
                .has_super_class_gap(size, declared, by_8, &self.layout)
            {
                let aligned = round_to(size, 8);
                if aligned > size {
                    slots.push(Slot::new(size, aligned - size));
                    size = aligned;
                }
            }

            for width in widths {
                if place_in_slots(&mut slots, width).is_none() {
                    let start = round_to(size, width);
                    if reuse && start > size {
                        slots.push(Slot::new(size, start - size));
                    }
                    size = start + width;
                }
            }

            let aligned = round_to(size, self.rules.field_block_alignment(&self.layout));
            if reuse && aligned > size {
                slots.push(Slot::new(size, aligned - size));
            }
            size = aligned;

            if reuse {
                carried = slots;
            }
        }

        size += self.policy.contention_padding(inventory);
        round_to(size, u64::from(self.layout.object_alignment()))
    }
}
