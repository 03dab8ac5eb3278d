//! Dependency-aware ordering of declarations
//!
//! Producer methods and injection points are sorted so that a declaration
//! whose output type is a structural dependency of another is processed
//! first. The comparator only sees dependencies expressed as declared
//! fields; parameter-only or interface-mediated dependencies are not
//! detected and fall back to encounter order. The comparator is not total
//! over mutually field-dependent types, so the sort's output for a cyclic
//! pair is unspecified and the underlying sort may reject it.

use crate::introspect::{ConstructorDecl, FieldDecl, Introspector, MethodDecl};
use itertools::Itertools;
use std::any::TypeId;
use std::cmp::Ordering;
use std::sync::Arc;

/// Partial comparator over declared types: the structural dependency sorts
/// earlier
pub struct DependencyComparator<'a> {
    introspector: &'a dyn Introspector,
}

impl<'a> DependencyComparator<'a> {
    pub fn new(introspector: &'a dyn Introspector) -> Self {
        Self { introspector }
    }

    /// `Greater` when `a` declares a field of type `b` (so `b` must be
    /// resolvable first), `Less` for the converse, `Equal` otherwise
    pub fn compare(&self, a: TypeId, b: TypeId) -> Ordering {
        if self.depends_on(a, b) {
            Ordering::Greater
        } else if self.depends_on(b, a) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    fn depends_on(&self, ty: TypeId, dependency: TypeId) -> bool {
        self.introspector
            .type_decl(ty)
            .is_some_and(|decl| decl.declares_field_of(dependency))
    }
}

/// Stable sorts over producer and injection-point declarations
pub struct DependencySorter<'a> {
    comparator: DependencyComparator<'a>,
}

impl<'a> DependencySorter<'a> {
    pub fn new(introspector: &'a dyn Introspector) -> Self {
        Self {
            comparator: DependencyComparator::new(introspector),
        }
    }

    /// Producers sorted by their return types
    pub fn sorted_producers(&self, methods: Vec<Arc<MethodDecl>>) -> Vec<Arc<MethodDecl>> {
        methods
            .into_iter()
            .sorted_by(|a, b| match (a.return_type, b.return_type) {
                (Some(ra), Some(rb)) => self.comparator.compare(ra.id(), rb.id()),
                _ => Ordering::Equal,
            })
            .collect()
    }

    /// Inject constructors sorted by their declaring types
    pub fn sorted_constructors(
        &self,
        constructors: Vec<Arc<ConstructorDecl>>,
    ) -> Vec<Arc<ConstructorDecl>> {
        constructors
            .into_iter()
            .sorted_by(|a, b| self.comparator.compare(a.owner.id(), b.owner.id()))
            .collect()
    }

    /// Inject fields sorted by their declaring types
    pub fn sorted_fields(&self, fields: Vec<Arc<FieldDecl>>) -> Vec<Arc<FieldDecl>> {
        fields
            .into_iter()
            .sorted_by(|a, b| self.comparator.compare(a.owner.id(), b.owner.id()))
            .collect()
    }

    /// Inject methods sorted by their declaring types
    pub fn sorted_methods(&self, methods: Vec<Arc<MethodDecl>>) -> Vec<Arc<MethodDecl>> {
        methods
            .into_iter()
            .sorted_by(|a, b| self.comparator.compare(a.owner.id(), b.owner.id()))
            .collect()
    }
}
