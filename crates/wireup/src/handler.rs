//! Dependency registry
//!
//! The keyed instance cache at the heart of the engine. Entries are cached
//! per (type, alias) key and created on demand by resolving a usable
//! constructor: directly for concrete types, through a single unambiguous
//! registered implementation for abstract ones.
//!
//! The cache uses a concurrent map as its storage idiom, but the engine
//! itself is single-threaded: concurrent `instance_by_key` calls against a
//! not-yet-created key race to create duplicate instances, so external
//! callers must serialize. Recursive calls during parameter resolution are
//! expected and re-enter the map safely; a dependency cycle not broken by an
//! already-registered alias recurses until the stack runs out.

use crate::alias::{AliasResolver, DEFAULT_ALIAS};
use crate::classifier::RoleClassifier;
use crate::error::{Error, Result};
use crate::introspect::{
    ConstructorDecl, Instance, Introspector, MethodDecl, ParamDecl, TypeDecl, TypeKey,
};
use crate::marker::Role;
use crate::proxy::{ProducerBinding, ProducerProxy};
use crate::value::{Literal, ValueResolver};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

/// A cached instance plus, for lazily-created proxy-eligible types, its
/// producer dispatch table
#[derive(Clone)]
struct Entry {
    target: Instance,
    proxy: Option<Arc<ProducerProxy>>,
}

/// Keyed instance cache with on-demand creation
pub struct DependencyHandler {
    entries: DashMap<(TypeId, String), Entry>,
    introspector: Arc<dyn Introspector>,
    classifier: Arc<RoleClassifier>,
    aliases: AliasResolver,
    values: ValueResolver,
}

impl DependencyHandler {
    pub fn new(introspector: Arc<dyn Introspector>, classifier: Arc<RoleClassifier>) -> Self {
        Self {
            entries: DashMap::new(),
            introspector,
            classifier: Arc::clone(&classifier),
            aliases: AliasResolver::new(Arc::clone(&classifier)),
            values: ValueResolver::new(classifier),
        }
    }

    /// Whether an entry exists for the given type and alias
    pub fn has_instance(&self, id: TypeId, alias: &str) -> bool {
        self.entries.contains_key(&(id, alias.to_string()))
    }

    /// The cached instance for the key, creating and registering one when
    /// missing
    pub fn instance_by_key(&self, key: TypeKey, alias: &str) -> Result<Instance> {
        if let Some(entry) = self.entries.get(&(key.id(), alias.to_string())) {
            return Ok(Arc::clone(&entry.target));
        }
        self.create_instance(key, alias)
    }

    /// Create, register and return an instance of the given type.
    ///
    /// A non-sealed concrete type with eligible producer methods is wrapped
    /// in a [`ProducerProxy`] so later producer dispatch can prefer
    /// registered values.
    pub fn create_instance(&self, key: TypeKey, alias: &str) -> Result<Instance> {
        let decl = self
            .introspector
            .type_decl(key.id())
            .ok_or_else(|| Error::unknown_declaration(key.name()))?;

        let (concrete, constructor) = self.suitable_constructor(&decl)?;
        let args = self.resolve_parameters(&constructor.params)?;
        let target = (constructor.factory)(&args)
            .map_err(|source| Error::instantiation(concrete.key.name(), source))?;

        let proxy = if concrete.is_sealed() {
            None
        } else {
            self.proxy_bindings(&concrete)?
                .map(|bindings| Arc::new(ProducerProxy::new(concrete.key, Arc::clone(&target), bindings)))
        };

        debug!(
            requested = %key,
            concrete = %concrete.key,
            alias,
            proxied = proxy.is_some(),
            "created instance"
        );
        self.insert(key.id(), alias, Entry { target: Arc::clone(&target), proxy });
        Ok(target)
    }

    /// Register an instance under each given alias (the default alias when
    /// none is given); a later registration for the same key overwrites
    pub fn register_instance(&self, key: TypeKey, instance: Instance, aliases: &[&str]) {
        let entry = Entry {
            target: instance,
            proxy: None,
        };
        if aliases.is_empty() {
            debug!(type_name = %key, alias = DEFAULT_ALIAS, "registered instance");
            self.insert(key.id(), DEFAULT_ALIAS, entry);
            return;
        }
        for alias in aliases {
            debug!(type_name = %key, alias, "registered instance");
            self.insert(key.id(), alias, entry.clone());
        }
    }

    /// Resolve each parameter: Value points through the value resolver,
    /// everything else through the registry under the parameter's alias
    pub fn resolve_parameters(&self, params: &[ParamDecl]) -> Result<Vec<Instance>> {
        params
            .iter()
            .map(|param| {
                if self.classifier.has_role(&param.markers, Role::Value) {
                    self.values
                        .value_of_param(param)
                        .map(Literal::into_instance)
                } else {
                    let alias = self.aliases.alias_of(&param.markers)?;
                    self.instance_by_key(param.value_type, &alias)
                }
            })
            .collect()
    }

    /// The value a producer method yields, honoring proxy overrides: when
    /// the declaring instance was lazily created the call dispatches through
    /// its proxy table, so an already-registered value for the return type
    /// wins over the method body
    pub fn producer_value(&self, method: &Arc<MethodDecl>) -> Result<Instance> {
        if method.is_static {
            let args = self.resolve_parameters(&method.params)?;
            return (method.body)(None, &args)?.ok_or_else(|| {
                Error::internal(format!("producer {} returned no value", method.describe()))
            });
        }

        let receiver = self.instance_by_key(method.owner, DEFAULT_ALIAS)?;
        if let Some(proxy) = self.proxy_for(method.owner.id(), DEFAULT_ALIAS) {
            return proxy.invoke(self, &method.name);
        }

        let args = self.resolve_parameters(&method.params)?;
        (method.body)(Some(&receiver), &args)?.ok_or_else(|| {
            Error::internal(format!("producer {} returned no value", method.describe()))
        })
    }

    /// The proxy attached to a cached entry, if any
    pub fn proxy_for(&self, id: TypeId, alias: &str) -> Option<Arc<ProducerProxy>> {
        self.entries
            .get(&(id, alias.to_string()))
            .and_then(|entry| entry.proxy.clone())
    }

    /// The alias resolver this handler uses
    pub fn aliases(&self) -> &AliasResolver {
        &self.aliases
    }

    /// The value resolver this handler uses
    pub fn values(&self) -> &ValueResolver {
        &self.values
    }

    /// The introspector this handler queries
    pub fn introspector(&self) -> &Arc<dyn Introspector> {
        &self.introspector
    }

    fn insert(&self, id: TypeId, alias: &str, entry: Entry) {
        self.entries.insert((id, alias.to_string()), entry);
    }

    /// Find a usable constructor: for a concrete type, the one with the
    /// fewest parameters (declaration order breaks ties); for an abstract
    /// type, recurse on its single registered concrete implementation
    fn suitable_constructor(
        &self,
        decl: &Arc<TypeDecl>,
    ) -> Result<(Arc<TypeDecl>, Arc<ConstructorDecl>)> {
        if decl.is_concrete() {
            let constructor = decl
                .constructors
                .iter()
                .min_by_key(|c| c.params.len())
                .cloned()
                .ok_or_else(|| Error::no_suitable_implementation(decl.key.name()))?;
            return Ok((Arc::clone(decl), constructor));
        }

        let candidates = self.introspector.concrete_subtypes_of(decl.key.id());
        match candidates.len() {
            0 => Err(Error::no_suitable_implementation(decl.key.name())),
            1 => self.suitable_constructor(&candidates[0]),
            count => Err(Error::ambiguous_implementation(decl.key.name(), count)),
        }
    }

    /// The producer bindings a lazily-created instance of this type needs;
    /// `None` when the type has no eligible producers
    fn proxy_bindings(&self, decl: &Arc<TypeDecl>) -> Result<Option<Vec<ProducerBinding>>> {
        let injectable = self.classifier.markers_of(Role::Injectable);
        let mut bindings = Vec::new();
        for method in &decl.methods {
            let marked = method.markers.iter().any(|m| injectable.contains(m.marker()));
            if !marked || !self.classifier.is_eligible_producer(method, decl) {
                continue;
            }
            let Some(return_type) = method.return_type else {
                continue;
            };
            bindings.push(ProducerBinding {
                method: Arc::clone(method),
                return_type,
                aliases: self.aliases.aliases_of(method)?,
            });
        }
        Ok((!bindings.is_empty()).then_some(bindings))
    }
}
