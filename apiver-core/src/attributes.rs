use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;

use crate::version::ApiVersion;

/// Marker for values usable as descriptor attributes.
///
/// Blanket-implemented: any `Clone + Eq + Hash` type qualifies. Equality is
/// what de-duplicates attributes across a descriptor group.
pub trait Attribute: Any + Clone + Eq + Hash + Send + Sync {}

impl<T: Any + Clone + Eq + Hash + Send + Sync> Attribute for T {}

/// A type-erased attribute store with two tiers: attributes declared on the
/// descriptor itself, and attributes it inherits (e.g. from a base
/// controller).
///
/// Internally stores `Vec<T>` per type, keyed by `TypeId`.
#[derive(Default)]
pub struct AttributeSet {
    declared: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    inherited: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute declared directly on the descriptor.
    pub fn declare<T: Attribute>(&mut self, item: T) -> &mut Self {
        entry::<T>(&mut self.declared).push(item);
        self
    }

    /// Add an attribute the descriptor inherits.
    pub fn inherit<T: Attribute>(&mut self, item: T) -> &mut Self {
        entry::<T>(&mut self.inherited).push(item);
        self
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn with<T: Attribute>(mut self, item: T) -> Self {
        self.declare(item);
        self
    }

    /// Builder form of [`inherit`](Self::inherit).
    pub fn with_inherited<T: Attribute>(mut self, item: T) -> Self {
        self.inherit(item);
        self
    }

    /// Attributes of type `T`: declared ones first, then inherited ones
    /// when `inherit` is true.
    pub fn get<T: Attribute>(&self, inherit: bool) -> Vec<T> {
        let mut out = slice::<T>(&self.declared).to_vec();
        if inherit {
            out.extend_from_slice(slice::<T>(&self.inherited));
        }
        out
    }

    /// Versions declared through [`ApiVersionAttribute`]s, inherited ones
    /// included, without duplicates.
    pub fn api_versions(&self) -> Vec<ApiVersion> {
        crate::distinct(
            self.get::<ApiVersionAttribute>(true)
                .into_iter()
                .flat_map(|attr| attr.versions),
        )
    }
}

impl std::fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSet")
            .field("declared_types", &self.declared.len())
            .field("inherited_types", &self.inherited.len())
            .finish()
    }
}

fn slice<T: Attribute>(map: &HashMap<TypeId, Box<dyn Any + Send + Sync>>) -> &[T] {
    map.get(&TypeId::of::<T>())
        .and_then(|boxed| boxed.downcast_ref::<Vec<T>>())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

fn entry<T: Attribute>(map: &mut HashMap<TypeId, Box<dyn Any + Send + Sync>>) -> &mut Vec<T> {
    map.entry(TypeId::of::<T>())
        .or_insert_with(|| Box::new(Vec::<T>::new()))
        .downcast_mut::<Vec<T>>()
        .expect("AttributeSet: type mismatch (should be impossible)")
}

/// Declares the API versions a controller implements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiVersionAttribute {
    pub versions: Vec<ApiVersion>,
}

impl ApiVersionAttribute {
    pub fn new(versions: impl IntoIterator<Item = ApiVersion>) -> Self {
        Self {
            versions: versions.into_iter().collect(),
        }
    }
}
