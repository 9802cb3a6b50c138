//! Immutable description of the host runtime's layout constants.
//!
//! A [`RuntimeLayout`] captures everything size-related the host fingerprint exposes: header
//! sizes, reference width, alignments, and the per-primitive storage widths. It is built once
//! at process start and passed explicitly into every strategy - no layout constant is ever
//! read from ambient state. Unmappable descriptions are rejected when the record is built,
//! never during a measurement.

use crate::{
    metadata::{PrimitiveKind, StorageKind},
    Result,
};

/// Storage widths shared by every known runtime: 1-byte booleans and bytes, 2-byte shorts and
/// chars, 4-byte ints and floats, 8-byte longs and doubles
const DEFAULT_PRIMITIVE_SIZES: [u32; PrimitiveKind::COUNT] = [1, 1, 2, 2, 4, 4, 8, 8];

/// Immutable record of the host runtime's layout constants.
///
/// # Examples
///
/// ```rust
/// use heapscope::RuntimeLayout;
///
/// // A 64-bit host with full-width references.
/// let layout = RuntimeLayout::modern();
/// assert_eq!(layout.object_header_size(), 16);
/// assert_eq!(layout.reference_size(), 8);
///
/// // Custom descriptions go through the validating builder.
/// let layout = RuntimeLayout::builder()
///     .object_header_size(12)
///     .array_header_size(16)
///     .reference_size(4)
///     .build()?;
/// assert_eq!(layout.reference_size(), 4);
/// # Ok::<(), heapscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeLayout {
    object_header_size: u32,
    array_header_size: u32,
    reference_size: u32,
    object_alignment: u32,
    super_field_alignment: u32,
    primitive_sizes: [u32; PrimitiveKind::COUNT],
}

impl RuntimeLayout {
    /// A 64-bit host with full-width references: 16-byte object header, 20-byte array header,
    /// 8-byte references, 8-byte object alignment, 8-byte super-class field blocks
    #[must_use]
    pub fn modern() -> Self {
        RuntimeLayout {
            object_header_size: 16,
            array_header_size: 20,
            reference_size: 8,
            object_alignment: 8,
            super_field_alignment: 8,
            primitive_sizes: DEFAULT_PRIMITIVE_SIZES,
        }
    }

    /// A 64-bit host with compressed references: 12-byte object header, 16-byte array header,
    /// 4-byte references, 8-byte object alignment, 8-byte super-class field blocks
    #[must_use]
    pub fn compressed() -> Self {
        RuntimeLayout {
            object_header_size: 12,
            array_header_size: 16,
            reference_size: 4,
            object_alignment: 8,
            super_field_alignment: 8,
            primitive_sizes: DEFAULT_PRIMITIVE_SIZES,
        }
    }

    /// A pre-15 64-bit host with compressed references, where super-class field blocks align
    /// to the reference size (4 bytes) instead of 8
    #[must_use]
    pub fn legacy() -> Self {
        RuntimeLayout {
            super_field_alignment: 4,
            ..RuntimeLayout::compressed()
        }
    }

    /// Starts a validating builder, seeded with the [`Self::modern`] constants
    #[must_use]
    pub fn builder() -> RuntimeLayoutBuilder {
        RuntimeLayoutBuilder {
            layout: RuntimeLayout::modern(),
        }
    }

    /// Bytes reserved for a scalar instance's header
    #[must_use]
    pub fn object_header_size(&self) -> u32 {
        self.object_header_size
    }

    /// Bytes reserved for an array instance's header, including the length slot
    #[must_use]
    pub fn array_header_size(&self) -> u32 {
        self.array_header_size
    }

    /// Storage width of a reference to another heap object
    #[must_use]
    pub fn reference_size(&self) -> u32 {
        self.reference_size
    }

    /// Boundary to which every instance's total size is rounded up
    #[must_use]
    pub fn object_alignment(&self) -> u32 {
        self.object_alignment
    }

    /// Boundary to which a super-class field block is aligned under 15+ default rules
    #[must_use]
    pub fn super_field_alignment(&self) -> u32 {
        self.super_field_alignment
    }

    /// Storage width of the given primitive kind
    #[must_use]
    pub fn primitive_size(&self, kind: PrimitiveKind) -> u32 {
        self.primitive_sizes[kind.index()]
    }

    /// Storage width of a field or array component of the given kind
    #[must_use]
    pub fn storage_size(&self, storage: StorageKind) -> u32 {
        match storage {
            StorageKind::Primitive(kind) => self.primitive_size(kind),
            StorageKind::Reference => self.reference_size,
        }
    }

    /// Checks the record against the constraints every strategy relies on.
    ///
    /// # Errors
    /// Returns [`UnsupportedLayout`](crate::Error::UnsupportedLayout) when the description
    /// cannot be mapped to a known layout: a reference size other than 4 or 8, a non
    /// power-of-two alignment, a zero header, a super-class field alignment the reference
    /// size does not divide, or a primitive width outside 1..=8.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.reference_size != 4 && self.reference_size != 8 {
            return Err(unsupported_layout!(
                "reference size of {} bytes, expected 4 or 8",
                self.reference_size
            ));
        }
        if !self.object_alignment.is_power_of_two() {
            return Err(unsupported_layout!(
                "object alignment of {} bytes is not a power of two",
                self.object_alignment
            ));
        }
        if !self.super_field_alignment.is_power_of_two() {
            return Err(unsupported_layout!(
                "super-class field alignment of {} bytes is not a power of two",
                self.super_field_alignment
            ));
        }
        if self.super_field_alignment % self.reference_size != 0 && self.reference_size != 8 {
            return Err(unsupported_layout!(
                "super-class field alignment of {} bytes is not divisible by the reference size of {} bytes",
                self.super_field_alignment,
                self.reference_size
            ));
        }
        if self.object_header_size == 0 || self.array_header_size == 0 {
            return Err(unsupported_layout!("header sizes must be non-zero"));
        }
        for kind_index in 0..PrimitiveKind::COUNT {
            let width = self.primitive_sizes[kind_index];
            if width == 0 || width > 8 || !width.is_power_of_two() {
                return Err(unsupported_layout!(
                    "primitive width of {} bytes is not supported",
                    width
                ));
            }
        }
        Ok(())
    }
}

impl Default for RuntimeLayout {
    fn default() -> Self {
        RuntimeLayout::modern()
    }
}

/// Builder pattern for custom [`RuntimeLayout`] records; [`Self::build`] validates
pub struct RuntimeLayoutBuilder {
    layout: RuntimeLayout,
}

impl RuntimeLayoutBuilder {
    /// Sets the scalar object header size in bytes
    #[must_use]
    pub fn object_header_size(mut self, bytes: u32) -> Self {
        self.layout.object_header_size = bytes;
        self
    }

    /// Sets the array header size in bytes
    #[must_use]
    pub fn array_header_size(mut self, bytes: u32) -> Self {
        self.layout.array_header_size = bytes;
        self
    }

    /// Sets the reference width in bytes (4 or 8)
    #[must_use]
    pub fn reference_size(mut self, bytes: u32) -> Self {
        self.layout.reference_size = bytes;
        self
    }

    /// Sets the object alignment in bytes
    #[must_use]
    pub fn object_alignment(mut self, bytes: u32) -> Self {
        self.layout.object_alignment = bytes;
        self
    }

    /// Sets the super-class field block alignment in bytes
    #[must_use]
    pub fn super_field_alignment(mut self, bytes: u32) -> Self {
        self.layout.super_field_alignment = bytes;
        self
    }

    /// Overrides the storage width of one primitive kind
    #[must_use]
    pub fn primitive_size(mut self, kind: PrimitiveKind, bytes: u32) -> Self {
        self.layout.primitive_sizes[kind.index()] = bytes;
        self
    }

    /// Validates and produces the immutable record.
    ///
    /// # Errors
    /// Returns [`UnsupportedLayout`](crate::Error::UnsupportedLayout) when the description
    /// cannot be mapped to a known layout.
    pub fn build(self) -> Result<RuntimeLayout> {
        self.layout.validate()?;
        Ok(self.layout)
    }
}
