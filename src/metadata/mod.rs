//! Class metadata model for a managed host runtime.
//!
//! Rust has no runtime reflection over arbitrary objects, so the host is modeled explicitly:
//! classes, fields, annotations, and instances are first-class values, registered in a
//! [`ClassRegistry`] that plays the role of the host's class loader. The layout core consumes
//! nothing but this model - it never inspects a real object's memory.
//!
//! # Key Components
//!
//! - [`ClassDescriptor`] - One class: identity, base link, declared fields, annotations
//! - [`ClassRegistry`] - Central registry owning every descriptor, token allocation, unloading
//! - [`ClassBuilder`] - Builder pattern for registering classes
//! - [`FieldDescriptor`] / [`FieldModifiers`] - Declared fields and their modifier flags
//! - [`Annotation`] - Annotation instances recognized by annotation-type identity
//! - [`PrimitiveKind`] / [`StorageKind`] - Storage classification of fields and array components
//! - [`Instance`] - A handle standing in for a live object reference
//!
//! # Inheritance and Liveness
//!
//! The registry holds the only long-lived strong references. Base-class links and cache
//! entries are weak, so removing a class from the registry behaves like class unloading on a
//! real host: anything still holding an [`Instance`] keeps the class measurable, and once the
//! last handle is gone the metadata becomes unreachable.

mod annotations;
mod builder;
mod class;
mod field;
mod instance;
mod primitives;
mod registry;
mod token;

use std::sync::Arc;

pub use annotations::Annotation;
pub use builder::ClassBuilder;
pub use class::{ClassDescriptor, ClassRc, ClassRef};
pub use field::{FieldDescriptor, FieldModifiers};
pub use instance::Instance;
pub(crate) use instance::InstanceShape;
pub use primitives::{PrimitiveKind, StorageKind};
pub use registry::ClassRegistry;
pub use token::Token;

/// Reference counted [`FieldDescriptor`]
pub type FieldRc = Arc<FieldDescriptor>;
/// A vector that holds the declared fields of one class
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;
