// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Typed variable maps attached to traversal contexts.
//!
//! Visitors pass auxiliary state between callbacks (and between a node and
//! its descendants) without widening the visitor signature by storing values
//! keyed by their Rust type. At most one value per type is stored.
//!
//! [`Vars`] is used by the sequential traverser and accepts any `'static`
//! value. [`SyncVars`] is used by the parallel traverser, whose contexts are
//! shared with worker threads, and therefore requires `Send + Sync` values.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Macro to generate a typed variable map over a given trait object type.
///
/// Both generated maps expose the same API; only the bounds on stored values
/// differ.
macro_rules! typed_vars {
    (
        $(#[$meta:meta])*
        $name:ident, ($($bound:tt)*)
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        pub struct $name {
            values: HashMap<TypeId, Box<dyn Any $($bound)*>>,
        }

        impl $name {
            /// Create an empty map.
            pub fn new() -> Self {
                Self::default()
            }

            /// Store a value, returning the previous value of the same type.
            pub fn insert<T: Any $($bound)*>(&mut self, value: T) -> Option<T> {
                self.values
                    .insert(TypeId::of::<T>(), Box::new(value))
                    .and_then(|previous| previous.downcast::<T>().ok())
                    .map(|previous| *previous)
            }

            /// Get the value of type `T`.
            pub fn get<T: Any $($bound)*>(&self) -> Option<&T> {
                self.values
                    .get(&TypeId::of::<T>())
                    .and_then(|value| value.downcast_ref::<T>())
            }

            /// Get the value of type `T` mutably.
            pub fn get_mut<T: Any $($bound)*>(&mut self) -> Option<&mut T> {
                self.values
                    .get_mut(&TypeId::of::<T>())
                    .and_then(|value| value.downcast_mut::<T>())
            }

            /// Remove and return the value of type `T`.
            pub fn remove<T: Any $($bound)*>(&mut self) -> Option<T> {
                self.values
                    .remove(&TypeId::of::<T>())
                    .and_then(|value| value.downcast::<T>().ok())
                    .map(|value| *value)
            }

            /// Returns true if a value of type `T` is stored.
            pub fn contains<T: Any $($bound)*>(&self) -> bool {
                self.values.contains_key(&TypeId::of::<T>())
            }

            /// Number of stored values.
            pub fn len(&self) -> usize {
                self.values.len()
            }

            /// Returns true if no values are stored.
            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("len", &self.values.len())
                    .finish()
            }
        }
    };
}

typed_vars! {
    /// Type-keyed variables for sequential traversals.
    Vars, ()
}

typed_vars! {
    /// Type-keyed variables that can be shared with worker threads.
    SyncVars, (+ Send + Sync)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Depth(usize);

    #[test]
    fn insert_get_remove() {
        let mut vars = Vars::new();
        assert!(vars.insert(Depth(1)).is_none());
        assert_eq!(vars.get::<Depth>(), Some(&Depth(1)));
        assert_eq!(vars.insert(Depth(2)), Some(Depth(1)));
        vars.get_mut::<Depth>().unwrap().0 += 1;
        assert_eq!(vars.remove::<Depth>(), Some(Depth(3)));
        assert!(vars.is_empty());
    }

    #[test]
    fn values_are_keyed_by_type() {
        let mut vars = Vars::new();
        vars.insert(1u32);
        vars.insert("label");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get::<u32>(), Some(&1));
        assert_eq!(vars.get::<&str>(), Some(&"label"));
        assert!(vars.get::<u64>().is_none());
    }

    #[test]
    fn vars_accept_non_send_values() {
        let mut vars = Vars::new();
        vars.insert(std::rc::Rc::new(5));
        assert!(vars.contains::<std::rc::Rc<i32>>());
    }

    #[test]
    fn sync_vars_roundtrip() {
        let mut vars = SyncVars::new();
        vars.insert(std::sync::Arc::new(Depth(4)));
        assert_eq!(
            vars.get::<std::sync::Arc<Depth>>().map(|d| d.0),
            Some(4)
        );
    }

    #[test]
    fn debug_shows_len() {
        let mut vars = SyncVars::new();
        vars.insert(1u8);
        assert_eq!(format!("{:?}", vars), "SyncVars { len: 1 }");
    }
}
