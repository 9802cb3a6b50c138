//! # heapscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the heapscope library. Import this module to get quick access to the essential
//! types for modeling a runtime and measuring object sizes.

pub use crate::{
    layout::{
        ContentionGroup, ContentionGroupAccessor, ContentionPolicy, RuntimeGeneration,
        RuntimeLayout, RuntimeLayoutBuilder, DEFAULT_CONTENTION_LINE_SIZE,
    },
    metadata::{
        Annotation, ClassBuilder, ClassDescriptor, ClassRc, ClassRef, ClassRegistry,
        FieldDescriptor, FieldModifiers, Instance, PrimitiveKind, StorageKind, Token,
    },
    meter::{MemoryMeter, MemoryMeterBuilder},
    Error, Result,
};
