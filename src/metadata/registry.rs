//! Central class registry.
//!
//! The registry is the authority owning every [`ClassDescriptor`] in a modeled runtime. It
//! hands out monotonically increasing [`Token`]s, keeps the descriptors in a lock-free
//! ordered map for token lookup, and maintains a full-name index for name lookup. Removing a
//! class models class unloading: once the last strong reference is gone, weak links from
//! subclasses and cache entries stop resolving, exactly like the host reclaiming a class.
//!
//! # Thread Safety
//!
//! Registration, lookup, and removal may race freely:
//! - Lock-free ordered storage for the primary token map (`SkipMap`)
//! - Concurrent hash map for the full-name index (`DashMap`)
//! - Atomic token allocation
//!
//! # Examples
//!
//! ```rust
//! use heapscope::prelude::*;
//!
//! let registry = ClassRegistry::new();
//! let point = ClassBuilder::new("geom", "Point")
//!     .field("x", StorageKind::Primitive(PrimitiveKind::Int))
//!     .register(&registry);
//!
//! assert_eq!(registry.len(), 1);
//! assert!(registry.get(&point.token).is_some());
//! assert!(registry.get_by_fullname("geom.Point").is_some());
//!
//! // Removal models class unloading.
//! registry.remove(&point.token);
//! assert!(registry.get(&point.token).is_none());
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::metadata::{
    annotations::Annotation,
    class::{ClassDescriptor, ClassRc},
    token::Token,
    FieldList,
};

/// Central registry managing all classes of a modeled runtime
pub struct ClassRegistry {
    classes: SkipMap<Token, ClassRc>,
    fullname_index: DashMap<String, Token>,
    next_token: AtomicU32,
}

impl ClassRegistry {
    /// Creates an empty registry; the first allocated token is 1
    #[must_use]
    pub fn new() -> Self {
        ClassRegistry {
            classes: SkipMap::new(),
            fullname_index: DashMap::new(),
            next_token: AtomicU32::new(1),
        }
    }

    /// Registers a class from its assembled parts, assigning the next token.
    ///
    /// Used by [`ClassBuilder::register`](crate::metadata::ClassBuilder::register); the
    /// returned `Arc` is the canonical strong reference, shared with the registry.
    pub(crate) fn insert(
        &self,
        namespace: String,
        name: String,
        base: Option<ClassRc>,
        fields: FieldList,
        annotations: Vec<Annotation>,
        introspectable: bool,
    ) -> ClassRc {
        let token = Token::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        let class = Arc::new(ClassDescriptor::new(
            token,
            namespace,
            name,
            base,
            fields,
            annotations,
            introspectable,
        ));

        self.fullname_index.insert(class.fullname(), token);
        self.classes.insert(token, class.clone());
        class
    }

    /// Looks up a class by token
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<ClassRc> {
        self.classes.get(token).map(|entry| entry.value().clone())
    }

    /// Looks up a class by its full name (Namespace.Name)
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<ClassRc> {
        let token = *self.fullname_index.get(fullname)?;
        self.get(&token)
    }

    /// Removes a class, modeling class unloading; returns the descriptor if it was present.
    ///
    /// The token is never reused. Weak links held by subclasses or caches stop resolving as
    /// soon as the last strong reference is dropped.
    pub fn remove(&self, token: &Token) -> Option<ClassRc> {
        let entry = self.classes.remove(token)?;
        let class = entry.value().clone();
        self.fullname_index
            .remove_if(&class.fullname(), |_, indexed| indexed == token);
        Some(class)
    }

    /// Number of registered classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no classes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        ClassRegistry::new()
    }
}
