//! Shallow size of array instances.
//!
//! Arrays do not pack: the layout is the array header followed by a dense run of elements,
//! rounded up to the object alignment. Every generation agrees on this path.

use crate::{
    layout::{round_to, runtime::RuntimeLayout},
    metadata::StorageKind,
    Error, Result,
};

/// Shallow size of an array with the given component kind and length.
///
/// # Errors
/// Returns [`Error::InvalidArray`] when the element run overflows the addressable size;
/// unreachable with a well-formed host runtime.
pub(crate) fn array_size(
    layout: &RuntimeLayout,
    component: StorageKind,
    length: usize,
) -> Result<u64> {
    let width = u64::from(layout.storage_size(component));
    let invalid = || Error::InvalidArray { length, width };

    let elements = width.checked_mul(length as u64).ok_or_else(invalid)?;
    let unaligned = elements
        .checked_add(u64::from(layout.array_header_size()))
        .ok_or_else(invalid)?;

    let alignment = u64::from(layout.object_alignment());
    if unaligned > u64::MAX - (alignment - 1) {
        return Err(invalid());
    }
    Ok(round_to(unaligned, alignment))
}
