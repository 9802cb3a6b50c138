// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # heapscope
//!
//! [![Crates.io](https://img.shields.io/crates/v/heapscope.svg)](https://crates.io/crates/heapscope)
//! [![Documentation](https://docs.rs/heapscope/badge.svg)](https://docs.rs/heapscope)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/heapscope/blob/main/LICENSE-APACHE)
//!
//! A cross-platform framework for modeling managed heap layouts and measuring shallow object
//! sizes. Built in pure Rust, `heapscope` reproduces a host runtime's field-packing,
//! super-class-gap-filling, and false-sharing-padding rules from static class metadata alone,
//! without attaching to a live runtime.
//!
//! ## Features
//!
//! - **📦 Faithful layout reproduction** - Field sorting, gap filling, and alignment
//!   arithmetic across several runtime generations whose rules differ in observable ways
//! - **🔍 Explicit host modeling** - Classes, fields, annotations, and instances are
//!   first-class values in a concurrent registry; nothing is read from ambient state
//! - **⚡ Cheap repeated measurement** - Per-class inventories are memoized in a weakly keyed
//!   concurrent cache that never pins unloaded classes
//! - **🔧 Cross-platform** - No instrumentation, no agents, no unsafe introspection
//! - **🛡️ Construction-time validation** - Unmappable runtime descriptions are rejected when
//!   the meter is built, never during a measurement
//! - **🧩 Configurable policies** - Contention padding, ignore rules, and layout constants
//!   are frozen per meter
//!
//! ## Quick Start
//!
//! Add `heapscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! heapscope = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use heapscope::prelude::*;
//!
//! // Model the host: register classes with their declared fields.
//! let registry = ClassRegistry::new();
//! let entry = ClassBuilder::new("collections", "Entry")
//!     .field("hash", StorageKind::Primitive(PrimitiveKind::Int))
//!     .field("key", StorageKind::Reference)
//!     .field("value", StorageKind::Reference)
//!     .field("next", StorageKind::Reference)
//!     .register(&registry);
//!
//! // Bind a meter to a runtime description and measure.
//! let meter = MemoryMeter::builder(RuntimeLayout::modern()).build()?;
//! assert_eq!(meter.measure(&Instance::of(&entry))?, 48);
//! assert_eq!(meter.measure(&Instance::reference_array(16))?, 152);
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! ### Choosing a Generation
//!
//! Hosts from different generations pack fields differently. The generation is selected once,
//! when the meter is built:
//!
//! ```rust
//! use heapscope::prelude::*;
//!
//! let generation = RuntimeGeneration::for_runtime(17, true)?;
//! assert_eq!(generation, RuntimeGeneration::Post15Default);
//!
//! let meter = MemoryMeter::builder(RuntimeLayout::compressed())
//!     .generation(generation)
//!     .build()?;
//! # let _ = meter;
//! # Ok::<(), heapscope::Error>(())
//! ```

#[macro_use]
mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the heapscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let meter = MemoryMeter::builder(RuntimeLayout::modern()).build()?;
/// assert_eq!(meter.measure(&Instance::primitive_array(PrimitiveKind::Byte, 10))?, 32);
/// # Ok::<(), heapscope::Error>(())
/// ```
pub mod prelude;

/// Class metadata model: registry, descriptors, fields, annotations, instances.
///
/// The host runtime is modeled explicitly - classes and fields are first-class values
/// registered in a [`metadata::ClassRegistry`]. See the module documentation for the
/// ownership and liveness rules that make class unloading observable.
pub mod metadata;

/// Layout reproduction: runtime descriptions, inventories, packing rules.
///
/// Everything size-related lives here: the immutable [`layout::RuntimeLayout`] record, the
/// per-class [`layout::ClassInventory`], the [`layout::ContentionPolicy`], and the
/// per-generation packing rules behind [`layout::RuntimeGeneration`].
pub mod layout;

/// The measurement facade: [`meter::MemoryMeter`] and its builder.
pub mod meter;

pub use error::Error;
pub use layout::{ContentionPolicy, RuntimeGeneration, RuntimeLayout};
pub use metadata::Instance;
pub use meter::{MemoryMeter, MemoryMeterBuilder};

/// Result type alias for this crate, using the crate's [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;
