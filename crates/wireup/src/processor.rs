//! Resolution driver
//!
//! Orchestrates one full pass: locate producers and injection points through
//! the introspector, order them with the dependency sorter, and drive the
//! handler through five ordered phases: producer, constructor injection,
//! field injection, method injection, literal values. A single failing
//! declaration aborts the pass immediately; registrations from earlier
//! phases are kept.

use crate::classifier::RoleClassifier;
use crate::error::{Error, Result};
use crate::handler::DependencyHandler;
use crate::introspect::{ConstructorDecl, FieldDecl, Instance, Introspector, MethodDecl, Scope};
use crate::marker::Role;
use crate::sort::DependencySorter;
use std::sync::Arc;
use tracing::{debug, info};

/// Drives the five resolution phases against a scope
pub struct MarkerProcessor {
    introspector: Arc<dyn Introspector>,
    classifier: Arc<RoleClassifier>,
    handler: Arc<DependencyHandler>,
}

impl MarkerProcessor {
    pub fn new(
        introspector: Arc<dyn Introspector>,
        classifier: Arc<RoleClassifier>,
        handler: Arc<DependencyHandler>,
    ) -> Self {
        Self {
            introspector,
            classifier,
            handler,
        }
    }

    /// Run the full pass. Phases never skip or reorder.
    pub fn process(&self, scope: &Scope) -> Result<()> {
        info!(?scope, "starting resolution pass");
        self.process_producers(scope)?;
        self.process_constructor_injections(scope)?;
        self.process_field_injections(scope)?;
        self.process_method_injections(scope)?;
        self.process_value_assignments(scope)?;
        info!("resolution pass complete");
        Ok(())
    }

    /// Phase 1: invoke eligible producer methods and register their return
    /// values under the aliases they declare
    fn process_producers(&self, scope: &Scope) -> Result<()> {
        let markers = self.classifier.markers_of(Role::Injectable);
        let producers: Vec<_> = self
            .introspector
            .methods_with_any(scope, &markers)
            .into_iter()
            .filter(|m| {
                self.owner_decl(m.owner.id())
                    .is_some_and(|owner| self.classifier.is_eligible_producer(m, &owner))
            })
            .collect();

        let sorter = DependencySorter::new(self.introspector.as_ref());
        for method in sorter.sorted_producers(producers) {
            debug!(producer = %method.describe(), "processing producer");
            self.run_producer(&method)
                .map_err(|source| Error::processing("producer", method.describe(), source))?;
        }
        Ok(())
    }

    fn run_producer(&self, method: &Arc<MethodDecl>) -> Result<()> {
        let value = self.handler.producer_value(method)?;
        let return_type = method.return_type.ok_or_else(|| {
            Error::internal(format!("producer {} has no return type", method.describe()))
        })?;
        let aliases = self.handler.aliases().aliases_of(method)?;
        let alias_refs: Vec<&str> = aliases.iter().map(String::as_str).collect();
        self.handler.register_instance(return_type, value, &alias_refs);
        Ok(())
    }

    /// Phase 2: construct and register component instances through their
    /// Inject-marked constructors, overwriting lazily-created ones
    fn process_constructor_injections(&self, scope: &Scope) -> Result<()> {
        let markers = self.classifier.markers_of(Role::Inject);
        let constructors: Vec<_> = self
            .introspector
            .constructors_with_any(scope, &markers)
            .into_iter()
            .filter(|c| {
                self.owner_decl(c.owner.id())
                    .is_some_and(|owner| self.classifier.is_eligible_injection_point(&owner))
            })
            .collect();

        let sorter = DependencySorter::new(self.introspector.as_ref());
        for constructor in sorter.sorted_constructors(constructors) {
            debug!(constructor = %constructor.describe(), "processing constructor injection");
            self.run_constructor_injection(&constructor).map_err(|source| {
                Error::processing("constructor-injection", constructor.describe(), source)
            })?;
        }
        Ok(())
    }

    fn run_constructor_injection(&self, constructor: &Arc<ConstructorDecl>) -> Result<()> {
        let args = self.handler.resolve_parameters(&constructor.params)?;
        let instance = (constructor.factory)(&args)
            .map_err(|source| Error::instantiation(constructor.owner.name(), source))?;
        self.handler.register_instance(constructor.owner, instance, &[]);
        Ok(())
    }

    /// Phase 3: assign Inject-marked fields from the registry
    fn process_field_injections(&self, scope: &Scope) -> Result<()> {
        let markers = self.classifier.markers_of(Role::Inject);
        let fields: Vec<_> = self
            .introspector
            .fields_with_any(scope, &markers)
            .into_iter()
            .filter(|f| {
                self.owner_decl(f.owner.id())
                    .is_some_and(|owner| self.classifier.is_eligible_injection_point(&owner))
            })
            .collect();

        let sorter = DependencySorter::new(self.introspector.as_ref());
        for field in sorter.sorted_fields(fields) {
            debug!(field = %field.describe(), "processing field injection");
            self.run_field_injection(&field)
                .map_err(|source| Error::processing("field-injection", field.describe(), source))?;
        }
        Ok(())
    }

    fn run_field_injection(&self, field: &Arc<FieldDecl>) -> Result<()> {
        let receiver = self.receiver_for(field.is_static, field.owner)?;
        let alias = self.handler.aliases().alias_of(&field.markers)?;
        let value = self.handler.instance_by_key(field.value_type, &alias)?;
        assign(field, receiver.as_ref(), value)
    }

    /// Phase 4: invoke Inject-marked methods with resolved parameters,
    /// discarding return values
    fn process_method_injections(&self, scope: &Scope) -> Result<()> {
        let markers = self.classifier.markers_of(Role::Inject);
        let methods: Vec<_> = self
            .introspector
            .methods_with_any(scope, &markers)
            .into_iter()
            .filter(|m| {
                self.owner_decl(m.owner.id())
                    .is_some_and(|owner| self.classifier.is_eligible_injection_point(&owner))
            })
            .collect();

        let sorter = DependencySorter::new(self.introspector.as_ref());
        for method in sorter.sorted_methods(methods) {
            debug!(method = %method.describe(), "processing method injection");
            self.run_method_injection(&method)
                .map_err(|source| Error::processing("method-injection", method.describe(), source))?;
        }
        Ok(())
    }

    fn run_method_injection(&self, method: &Arc<MethodDecl>) -> Result<()> {
        let receiver = self.receiver_for(method.is_static, method.owner)?;
        let args = self.handler.resolve_parameters(&method.params)?;
        (method.body)(receiver.as_ref(), &args)?;
        Ok(())
    }

    /// Phase 5: assign every Value-marked field its resolved literal
    fn process_value_assignments(&self, scope: &Scope) -> Result<()> {
        let markers = self.classifier.markers_of(Role::Value);
        let fields = self.introspector.fields_with_any(scope, &markers);

        for field in fields {
            debug!(field = %field.describe(), "processing value assignment");
            self.run_value_assignment(&field)
                .map_err(|source| Error::processing("value", field.describe(), source))?;
        }
        Ok(())
    }

    fn run_value_assignment(&self, field: &Arc<FieldDecl>) -> Result<()> {
        let receiver = self.receiver_for(field.is_static, field.owner)?;
        let literal = self.handler.values().value_of_field(field)?;
        assign(field, receiver.as_ref(), literal.into_instance())
    }

    /// Static members need no receiver; everything else gets the declaring
    /// instance under the default alias, lazily created if necessary
    fn receiver_for(
        &self,
        is_static: bool,
        owner: crate::introspect::TypeKey,
    ) -> Result<Option<Instance>> {
        if is_static {
            return Ok(None);
        }
        self.handler
            .instance_by_key(owner, crate::alias::DEFAULT_ALIAS)
            .map(Some)
    }

    fn owner_decl(&self, id: std::any::TypeId) -> Option<Arc<crate::introspect::TypeDecl>> {
        self.introspector.type_decl(id)
    }
}

fn assign(field: &FieldDecl, receiver: Option<&Instance>, value: Instance) -> Result<()> {
    let setter = field
        .setter
        .as_ref()
        .ok_or_else(|| Error::internal(format!("field {} has no setter", field.describe())))?;
    setter(receiver, value)
}
