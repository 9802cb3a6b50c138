//! Runtime generations and the packing-rule table keyed by them.
//!
//! The host runtimes this crate reproduces differ in small but observable ways: how a
//! super-class field block is aligned, and when a sub-8-byte gap in the running size may be
//! filled with smaller fields. Those two decision points are the only variation between
//! generations, so they live in a single [`LayoutRules`] table keyed by [`RuntimeGeneration`]
//! rather than in a hierarchy of strategy types.

use strum::{Display, EnumIter};

use crate::{layout::runtime::RuntimeLayout, Result};

/// Lowest host major version with a known field layout
const MIN_SUPPORTED_MAJOR: u32 = 7;

/// Super-class field blocks align to 4 bytes when empty-slot reuse is disabled on a 15+ host
const NO_REUSE_BLOCK_ALIGNMENT: u64 = 4;

/// Which generation of field-packing rules the host runtime applies.
///
/// # Examples
///
/// ```rust
/// use heapscope::RuntimeGeneration;
///
/// assert_eq!(RuntimeGeneration::for_runtime(11, true)?, RuntimeGeneration::Pre15);
/// assert_eq!(RuntimeGeneration::for_runtime(17, true)?, RuntimeGeneration::Post15Default);
/// assert_eq!(
///     RuntimeGeneration::for_runtime(17, false)?,
///     RuntimeGeneration::Post15NoEmptySlotReuse
/// );
/// assert!(RuntimeGeneration::for_runtime(5, true).is_err());
/// # Ok::<(), heapscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RuntimeGeneration {
    /// Hosts before version 15: blocks align to the reference size, and a trailing gap is
    /// only filled with smaller fields of the class that created it
    Pre15,
    /// Hosts from version 15 on with empty-slot reuse enabled (the default): blocks align to
    /// the super-class field alignment, and every alignment hole remains available to later
    /// classes in the chain
    Post15Default,
    /// Hosts from version 15 on with empty-slot reuse disabled: blocks align to 4 bytes and
    /// gap filling degrades to a narrow special case
    Post15NoEmptySlotReuse,
}

impl RuntimeGeneration {
    /// Maps a host fingerprint to a generation.
    ///
    /// This is the only place the host runtime is inspected; the chosen generation then
    /// operates purely on the static description it was given.
    ///
    /// # Arguments
    /// * `major` - Host major version
    /// * `empty_slot_reuse` - Whether the host fills empty super-class slots (the 15+ default)
    ///
    /// # Errors
    /// Returns [`UnsupportedLayout`](crate::Error::UnsupportedLayout) for hosts older than
    /// the oldest generation with known packing rules.
    pub fn for_runtime(major: u32, empty_slot_reuse: bool) -> Result<Self> {
        if major < MIN_SUPPORTED_MAJOR {
            return Err(unsupported_layout!(
                "host major version {} predates the oldest known field layout",
                major
            ));
        }
        if major < 15 {
            return Ok(RuntimeGeneration::Pre15);
        }
        if empty_slot_reuse {
            Ok(RuntimeGeneration::Post15Default)
        } else {
            Ok(RuntimeGeneration::Post15NoEmptySlotReuse)
        }
    }

    pub(crate) fn rules(self) -> LayoutRules {
        LayoutRules { generation: self }
    }
}

/// The two per-generation decision points of the packing skeleton
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutRules {
    generation: RuntimeGeneration,
}

impl LayoutRules {
    /// Boundary to which the running size is advanced at the end of a class's field block
    pub(crate) fn field_block_alignment(&self, layout: &RuntimeLayout) -> u64 {
        match self.generation {
            RuntimeGeneration::Pre15 => u64::from(layout.reference_size()),
            RuntimeGeneration::Post15Default => u64::from(layout.super_field_alignment()),
            RuntimeGeneration::Post15NoEmptySlotReuse => NO_REUSE_BLOCK_ALIGNMENT,
        }
    }

    /// Whether alignment holes survive the block that created them and remain available to
    /// later classes in the chain
    pub(crate) fn reuses_empty_slots(&self) -> bool {
        matches!(self.generation, RuntimeGeneration::Post15Default)
    }

    /// Whether the sub-8-byte gap between the running size and the next 8-byte boundary may
    /// be filled with smaller fields of the class about to be laid out.
    ///
    /// # Arguments
    /// * `size` - Running size before the class's first field
    /// * `declared` - Sum of the class's surviving field widths
    /// * `by_8` - Portion of `declared` contributed by 8-byte fields
    pub(crate) fn has_super_class_gap(
        &self,
        size: u64,
        declared: u64,
        by_8: u64,
        layout: &RuntimeLayout,
    ) -> bool {
        let gap_below_8 = size % 8 != 0;
        match self.generation {
            RuntimeGeneration::Pre15 | RuntimeGeneration::Post15Default => gap_below_8 && by_8 > 0,
            RuntimeGeneration::Post15NoEmptySlotReuse => {
                gap_below_8
                    && (by_8 > 0 || layout.reference_size() == 8)
                    && (size == u64::from(layout.object_header_size()) || declared == by_8)
            }
        }
    }
}
