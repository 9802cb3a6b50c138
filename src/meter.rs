//! The measurement facade and its builder.
//!
//! A [`MemoryMeter`] binds a runtime description, a generation of packing rules, a contention
//! policy, and an optional ignore predicate into one immutable measuring instrument. The
//! builder is the only component that validates the host description; once built, a meter
//! never fails for configuration reasons and may be shared freely across threads.

use crate::{
    layout::{
        array_size, ContentionPolicy, IgnorePredicate, InventoryCache, LayoutStrategy,
        RuntimeGeneration, RuntimeLayout,
    },
    metadata::{ClassRc, FieldDescriptor, Instance, InstanceShape},
    Result,
};

use std::sync::Arc;

/// Builder pattern for [`MemoryMeter`].
///
/// # Examples
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let meter = MemoryMeter::builder(RuntimeLayout::compressed())
///     .generation(RuntimeGeneration::Pre15)
///     .build()?;
/// assert_eq!(meter.generation(), RuntimeGeneration::Pre15);
/// # Ok::<(), heapscope::Error>(())
/// ```
pub struct MemoryMeterBuilder {
    layout: RuntimeLayout,
    generation: RuntimeGeneration,
    contention: ContentionPolicy,
    ignored_fields: Option<IgnorePredicate>,
}

impl MemoryMeterBuilder {
    /// Starts a builder for the given runtime description; the generation defaults to
    /// [`RuntimeGeneration::Post15Default`] and contention padding to
    /// [`ContentionPolicy::Disabled`]
    #[must_use]
    pub fn new(layout: RuntimeLayout) -> Self {
        MemoryMeterBuilder {
            layout,
            generation: RuntimeGeneration::Post15Default,
            contention: ContentionPolicy::Disabled,
            ignored_fields: None,
        }
    }

    /// Selects the generation of packing rules
    #[must_use]
    pub fn generation(mut self, generation: RuntimeGeneration) -> Self {
        self.generation = generation;
        self
    }

    /// Selects the contention padding policy
    #[must_use]
    pub fn contention(mut self, contention: ContentionPolicy) -> Self {
        self.contention = contention;
        self
    }

    /// Extends the default ignore rule (static or ignore-marked fields) with a predicate;
    /// fields for which it returns true contribute no storage
    #[must_use]
    pub fn ignored_fields<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> bool + Send + Sync + 'static,
    {
        self.ignored_fields = Some(Arc::new(predicate));
        self
    }

    /// Validates the description and freezes the meter.
    ///
    /// # Errors
    /// Returns [`UnsupportedLayout`](crate::Error::UnsupportedLayout) when the runtime
    /// description cannot be mapped to a known layout. Measurement itself never raises this.
    pub fn build(self) -> Result<MemoryMeter> {
        self.layout.validate()?;
        Ok(MemoryMeter {
            strategy: LayoutStrategy::new(self.layout, self.generation, self.contention),
            generation: self.generation,
            ignored_fields: self.ignored_fields,
            inventories: InventoryCache::new(),
        })
    }
}

/// Measures the shallow byte footprint the host runtime reserves for live objects.
///
/// The meter is immutable after construction; the only shared mutable state is the inventory
/// cache, which is safe for concurrent use and tolerates benign recomputation.
///
/// # Examples
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let registry = ClassRegistry::new();
/// let point = ClassBuilder::new("geom", "Point")
///     .field("x", StorageKind::Primitive(PrimitiveKind::Double))
///     .field("y", StorageKind::Primitive(PrimitiveKind::Double))
///     .register(&registry);
///
/// let meter = MemoryMeter::builder(RuntimeLayout::modern()).build()?;
/// assert_eq!(meter.measure(&Instance::of(&point))?, 32);
/// assert_eq!(meter.measure(&Instance::primitive_array(PrimitiveKind::Int, 3))?, 32);
/// # Ok::<(), heapscope::Error>(())
/// ```
pub struct MemoryMeter {
    strategy: LayoutStrategy,
    generation: RuntimeGeneration,
    ignored_fields: Option<IgnorePredicate>,
    inventories: InventoryCache,
}

impl MemoryMeter {
    /// Starts a [`MemoryMeterBuilder`] for the given runtime description
    #[must_use]
    pub fn builder(layout: RuntimeLayout) -> MemoryMeterBuilder {
        MemoryMeterBuilder::new(layout)
    }

    /// Shallow byte footprint the runtime reserves for the object behind the handle.
    ///
    /// The result depends only on the object's class (or, for arrays, component kind and
    /// length), never on instance state.
    ///
    /// # Errors
    /// - [`ReflectionUnavailable`](crate::Error::ReflectionUnavailable) when class metadata
    ///   cannot be inspected
    /// - [`RecursionLimit`](crate::Error::RecursionLimit) for degenerate inheritance chains
    /// - [`InvalidArray`](crate::Error::InvalidArray) for array extents that overflow
    pub fn measure(&self, instance: &Instance) -> Result<u64> {
        match instance.shape() {
            InstanceShape::Scalar(class) => self.measure_class(class),
            InstanceShape::Array { component, length } => {
                array_size(self.strategy.layout(), *component, *length)
            }
        }
    }

    /// Shallow size of any instance of the given class; equivalent to measuring a handle
    /// created with [`Instance::of`]
    ///
    /// # Errors
    /// Same as [`Self::measure`].
    pub fn measure_class(&self, class: &ClassRc) -> Result<u64> {
        let inventory = self.inventories.get_or_inspect(
            class,
            self.strategy.policy(),
            self.ignored_fields.as_ref(),
        )?;
        Ok(self.strategy.instance_size(&inventory))
    }

    /// The generation of packing rules the meter was bound to
    #[must_use]
    pub fn generation(&self) -> RuntimeGeneration {
        self.generation
    }

    /// The runtime description the meter was bound to
    #[must_use]
    pub fn runtime_layout(&self) -> &RuntimeLayout {
        self.strategy.layout()
    }

    /// Number of classes with a cached inventory, including entries whose class has been
    /// unloaded but not yet purged
    #[must_use]
    pub fn cached_inventories(&self) -> usize {
        self.inventories.len()
    }

    /// Evicts cache entries whose class has been unloaded; returns how many were dropped
    pub fn purge_cache(&self) -> usize {
        self.inventories.purge_stale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ClassBuilder, ClassRegistry, PrimitiveKind, StorageKind};
    use crate::Error;

    #[test]
    fn test_builder_defaults() {
        let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();
        assert_eq!(meter.generation(), RuntimeGeneration::Post15Default);
        assert_eq!(meter.runtime_layout().object_header_size(), 16);
    }

    #[test]
    fn test_build_rejects_bad_layouts() {
        // Presets cannot produce this; only a hand-rolled record can.
        let layout = RuntimeLayout::builder()
            .reference_size(4)
            .super_field_alignment(2)
            .build();
        assert!(matches!(layout, Err(Error::UnsupportedLayout { .. })));
    }

    #[test]
    fn test_measure_dispatches_on_shape() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "OneInt")
            .field("value", StorageKind::Primitive(PrimitiveKind::Int))
            .register(&registry);
        let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();

        assert_eq!(meter.measure(&Instance::of(&class)).unwrap(), 24);
        assert_eq!(
            meter.measure(&Instance::primitive_array(PrimitiveKind::Int, 0)).unwrap(),
            24
        );
        assert_eq!(meter.measure(&Instance::reference_array(2)).unwrap(), 40);
    }

    #[test]
    fn test_measure_class_matches_instance_path() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "Node")
            .field("next", StorageKind::Reference)
            .register(&registry);
        let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();

        assert_eq!(
            meter.measure_class(&class).unwrap(),
            meter.measure(&Instance::of(&class)).unwrap()
        );
    }

    #[test]
    fn test_inventories_are_cached_and_purgeable() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "Cached")
            .field("value", StorageKind::Primitive(PrimitiveKind::Long))
            .register(&registry);
        let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();

        meter.measure_class(&class).unwrap();
        meter.measure_class(&class).unwrap();
        assert_eq!(meter.cached_inventories(), 1);
        assert_eq!(meter.purge_cache(), 0);

        registry.remove(&class.token);
        drop(class);
        assert_eq!(meter.purge_cache(), 1);
        assert_eq!(meter.cached_inventories(), 0);
    }

    #[test]
    fn test_ignored_fields_predicate() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "WithScratch")
            .field("value", StorageKind::Primitive(PrimitiveKind::Int))
            .field("scratch0", StorageKind::Primitive(PrimitiveKind::Long))
            .field("scratch1", StorageKind::Primitive(PrimitiveKind::Long))
            .register(&registry);

        let plain = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();
        let filtered = MemoryMeter::builder(RuntimeLayout::modern())
            .ignored_fields(|field| field.name.starts_with("scratch"))
            .build()
            .unwrap();

        assert_eq!(plain.measure_class(&class).unwrap(), 40);
        assert_eq!(filtered.measure_class(&class).unwrap(), 24);
    }

    #[test]
    fn test_meter_is_shareable_across_threads() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "Shared")
            .field("value", StorageKind::Primitive(PrimitiveKind::Int))
            .register(&registry);
        let meter = std::sync::Arc::new(
            MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let meter = std::sync::Arc::clone(&meter);
                let class = class.clone();
                std::thread::spawn(move || meter.measure_class(&class).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 24);
        }
    }
}
