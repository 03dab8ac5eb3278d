//! Injection facade
//!
//! [`DependencyInjector`] wires the classifier, handler and processor
//! together behind one entry point. Construct it over a declaration
//! registry, call [`DependencyInjector::resolve`] for one or more scopes,
//! then pull typed instances out.
//!
//! ```text
//! let registry = DeclarationRegistry::builder()
//!     .concrete_type::<AppConfig>("app").marker(...).method(...).register()
//!     .concrete_type::<Service>("app").marker(...).constructor(...).register()
//!     .build();
//! let injector = DependencyInjector::new(Arc::new(registry));
//! injector.resolve(&Scope::everything())?;
//! let service: Arc<Service> = injector.instance_of()?;
//! ```

use crate::classifier::RoleClassifier;
use crate::error::{Error, Result};
use crate::handler::DependencyHandler;
use crate::introspect::{downcast, Instance, Introspector, Scope, TypeKey};
use crate::marker::MarkerVocabulary;
use crate::processor::MarkerProcessor;
use std::sync::Arc;
use tracing::debug;

/// Entry point over a declaration registry
pub struct DependencyInjector {
    handler: Arc<DependencyHandler>,
    processor: MarkerProcessor,
}

impl DependencyInjector {
    /// An injector over the given declarations with only the canonical
    /// markers in play
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self::with_vocabulary(introspector, MarkerVocabulary::new())
    }

    /// An injector over the given declarations with custom markers defined
    /// in `vocabulary`
    pub fn with_vocabulary(
        introspector: Arc<dyn Introspector>,
        vocabulary: MarkerVocabulary,
    ) -> Self {
        let classifier = Arc::new(RoleClassifier::new(Arc::new(vocabulary)));
        let handler = Arc::new(DependencyHandler::new(
            Arc::clone(&introspector),
            Arc::clone(&classifier),
        ));
        let processor = MarkerProcessor::new(introspector, classifier, Arc::clone(&handler));
        Self { handler, processor }
    }

    /// Run one full resolution pass over the scope. May be called more than
    /// once with different scopes; instances registered by earlier passes
    /// stay registered.
    pub fn resolve(&self, scope: &Scope) -> Result<()> {
        self.processor.process(scope)
    }

    /// The instance of `T` registered under the default alias, created
    /// lazily if necessary
    pub fn instance_of<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.instance_with_alias(crate::alias::DEFAULT_ALIAS)
    }

    /// The instance of `T` registered under `alias`, created lazily if
    /// necessary
    pub fn instance_with_alias<T: Send + Sync + 'static>(&self, alias: &str) -> Result<Arc<T>> {
        let instance = self.handler.instance_by_key(TypeKey::of::<T>(), alias)?;
        downcast(instance)
    }

    /// The untyped instance registered under the given key and alias
    pub fn instance_by_key(&self, key: TypeKey, alias: &str) -> Result<Instance> {
        self.handler.instance_by_key(key, alias)
    }

    /// Register an externally-built instance of `T` under the given aliases.
    /// An empty alias list registers under the default alias; existing
    /// registrations under the same keys are overwritten.
    pub fn register<T: Send + Sync + 'static>(&self, instance: T, aliases: &[&str]) {
        self.register_arc(Arc::new(instance), aliases);
    }

    /// [`DependencyInjector::register`] for an instance already behind an `Arc`
    pub fn register_arc<T: Send + Sync + 'static>(&self, instance: Arc<T>, aliases: &[&str]) {
        debug!(type_name = std::any::type_name::<T>(), ?aliases, "registering external instance");
        self.handler
            .register_instance(TypeKey::of::<T>(), instance, aliases);
    }

    /// Invoke the named producer method declared on `T` through its override
    /// dispatch, returning the producer's value. Goes through the same path
    /// the resolution pass uses, so an already-registered instance under the
    /// producer's alias short-circuits the body.
    pub fn producer_value_of<T: Send + Sync + 'static>(&self, method: &str) -> Result<Instance> {
        let key = TypeKey::of::<T>();
        let decl = self
            .handler
            .introspector()
            .type_decl(key.id())
            .ok_or_else(|| Error::unknown_declaration(key.name()))?;
        let method = decl
            .method(method)
            .ok_or_else(|| Error::unknown_declaration(format!("{key}::{method}")))?;
        self.handler.producer_value(method)
    }

    /// The underlying handler, for direct registry access
    pub fn handler(&self) -> &Arc<DependencyHandler> {
        &self.handler
    }
}
