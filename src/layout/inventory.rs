//! Per-class field inventory and its concurrent, weakly keyed cache.
//!
//! The inventory is the bridge between class metadata and the packing skeleton: for one
//! concrete class it materializes the base-class chain from the root down and, per class in
//! the chain, the declared instance fields that survive filtering (static and ignore-marked
//! fields drop out, synthetic fields stay). Contention resolution is applied while the
//! inventory is built, because the cache belongs to one meter whose policy never changes.
//!
//! Inventories are pure functions of the class, so the cache tolerates the benign race of
//! two threads computing the same entry; the last insert wins and both results are equal.
//! Entries hold only a weak link back to the class, keeping the cache from pinning classes
//! the host has unloaded.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::{
    layout::contention::{ContentionGroup, ContentionPolicy},
    metadata::{ClassDescriptor, ClassRc, FieldDescriptor, StorageKind, Token},
    Error, Result,
};

/// Deepest inheritance chain the inventory will walk; also defuses cyclic base links
const MAX_CHAIN_DEPTH: usize = 512;

/// Extends the default ignore rule (static or ignore-marked) with a caller-supplied predicate
pub type IgnorePredicate = Arc<dyn Fn(&FieldDescriptor) -> bool + Send + Sync>;

/// One surviving instance field, ready for packing
#[derive(Debug, Clone)]
pub struct InventoryField {
    name: Arc<str>,
    storage: StorageKind,
    contention: Option<ContentionGroup>,
}

impl InventoryField {
    /// Field name within its declaring class
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage classification
    #[must_use]
    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    /// Resolved contention group, `None` for fields that request no padding
    #[must_use]
    pub fn contention(&self) -> Option<&ContentionGroup> {
        self.contention.as_ref()
    }
}

/// One class of the chain with its surviving fields in declaration order
#[derive(Debug, Clone)]
pub struct InventoryClass {
    fullname: Arc<str>,
    contended: bool,
    fields: Vec<InventoryField>,
}

impl InventoryClass {
    /// Full name of the declaring class
    #[must_use]
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// Whether the class type itself requests whole-object padding
    #[must_use]
    pub fn contended(&self) -> bool {
        self.contended
    }

    /// Surviving instance fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[InventoryField] {
        &self.fields
    }
}

/// The ordered field inventory of one concrete class.
///
/// The chain runs from the root base class down to the concrete class; classes whose fields
/// were all filtered away stay in the chain, since their type may still request padding.
#[derive(Debug, Clone)]
pub struct ClassInventory {
    chain: Vec<InventoryClass>,
}

impl ClassInventory {
    /// Walks the class metadata and materializes the inventory.
    ///
    /// # Errors
    /// - [`Error::ReflectionUnavailable`] when a class in the chain is closed to
    ///   introspection or a base-class link no longer resolves
    /// - [`Error::RecursionLimit`] when the chain exceeds the supported depth
    pub(crate) fn inspect(
        class: &ClassRc,
        policy: &ContentionPolicy,
        extra_ignore: Option<&IgnorePredicate>,
    ) -> Result<Self> {
        let mut lineage: Vec<ClassRc> = Vec::new();
        let mut current = class.clone();

        loop {
            if !current.introspectable {
                return Err(Error::ReflectionUnavailable {
                    class: current.fullname(),
                    reason: "class metadata is not open to introspection".to_string(),
                });
            }
            lineage.push(current.clone());
            if lineage.len() > MAX_CHAIN_DEPTH {
                return Err(Error::RecursionLimit(MAX_CHAIN_DEPTH));
            }

            let base = match current.base_ref() {
                None => None,
                Some(link) => match link.upgrade() {
                    Some(base) => Some(base),
                    None => {
                        return Err(Error::ReflectionUnavailable {
                            class: current.fullname(),
                            reason: "base class has been unloaded".to_string(),
                        });
                    }
                },
            };
            match base {
                Some(base) => current = base,
                None => break,
            }
        }

        // Root base class first, concrete class last.
        lineage.reverse();

        let chain = lineage
            .iter()
            .map(|member| InventoryClass {
                fullname: member.fullname().into(),
                contended: policy.class_contended(member),
                fields: Self::surviving_fields(member, policy, extra_ignore),
            })
            .collect();

        Ok(ClassInventory { chain })
    }

    fn surviving_fields(
        class: &ClassDescriptor,
        policy: &ContentionPolicy,
        extra_ignore: Option<&IgnorePredicate>,
    ) -> Vec<InventoryField> {
        class
            .fields
            .iter()
            .map(|(_, field)| field)
            .filter(|field| !field.is_ignored())
            .filter(|field| extra_ignore.map_or(true, |ignore| !ignore(field)))
            .map(|field| InventoryField {
                name: field.name.as_str().into(),
                storage: field.storage,
                contention: policy.field_group(field),
            })
            .collect()
    }

    /// The base-class chain, root first
    #[must_use]
    pub fn chain(&self) -> &[InventoryClass] {
        &self.chain
    }

    /// Total number of surviving fields across the chain
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.chain.iter().map(|class| class.fields.len()).sum()
    }
}

struct CacheEntry {
    class: Weak<ClassDescriptor>,
    inventory: Arc<ClassInventory>,
}

/// Concurrent inventory cache keyed by class token, holding its classes weakly
pub(crate) struct InventoryCache {
    entries: DashMap<Token, CacheEntry>,
}

impl InventoryCache {
    pub(crate) fn new() -> Self {
        InventoryCache {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached inventory for the class, computing and inserting it if the entry is
    /// missing or refers to a class that has since been unloaded
    pub(crate) fn get_or_inspect(
        &self,
        class: &ClassRc,
        policy: &ContentionPolicy,
        extra_ignore: Option<&IgnorePredicate>,
    ) -> Result<Arc<ClassInventory>> {
        if let Some(entry) = self.entries.get(&class.token) {
            if let Some(live) = entry.class.upgrade() {
                if Arc::ptr_eq(&live, class) {
                    return Ok(entry.inventory.clone());
                }
            }
        }

        let inventory = Arc::new(ClassInventory::inspect(class, policy, extra_ignore)?);
        self.entries.insert(
            class.token,
            CacheEntry {
                class: Arc::downgrade(class),
                inventory: inventory.clone(),
            },
        );
        Ok(inventory)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops entries whose class has been unloaded; returns how many were evicted
    pub(crate) fn purge_stale(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.class.strong_count() > 0);
        before - self.entries.len()
    }
}
