//! Declarative dependency resolution engine
//!
//! Types register their constructors, fields, producer methods and markers
//! as declarations; the engine classifies the markers into roles, orders the
//! work by field dependencies, and drives a five-phase resolution pass that
//! fills a (type, alias)-keyed registry of shared instances.
//!
//! ## Architecture
//!
//! - `marker`: marker instances, definitions and the extensible vocabulary
//! - `classifier`: role closures computed by fixpoint over the vocabulary
//! - `introspect`: the declaration model and its registry/builder
//! - `alias`: alias extraction for injection points and producers
//! - `value`: literal parsing for Value-marked fields and parameters
//! - `sort`: field-dependency ordering of producers and injection points
//! - `handler`: the instance registry with lazy creation and proxying
//! - `proxy`: producer-method override dispatch
//! - `processor`: the five-phase resolution driver
//! - `injector`: the public facade
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wireup::{
//!     ConstructorDecl, DeclarationRegistry, DependencyInjector, Instance, MarkerInstance,
//!     Role, Scope,
//! };
//!
//! struct Greeter;
//!
//! let registry = DeclarationRegistry::builder()
//!     .concrete_type::<Greeter>("app")
//!     .marker(MarkerInstance::of_role(Role::Component))
//!     .constructor(ConstructorDecl::new(|_| Ok(Arc::new(Greeter) as Instance)))
//!     .register()
//!     .build();
//!
//! let injector = DependencyInjector::new(Arc::new(registry));
//! injector.resolve(&Scope::everything()).unwrap();
//! let greeter: Arc<Greeter> = injector.instance_of().unwrap();
//! # let _ = greeter;
//! ```

pub mod alias;
pub mod classifier;
pub mod error;
pub mod handler;
pub mod injector;
pub mod introspect;
pub mod logging;
pub mod marker;
pub mod processor;
pub mod proxy;
pub mod sort;
pub mod value;

pub use alias::{AliasResolver, DEFAULT_ALIAS};
pub use classifier::RoleClassifier;
pub use error::{Error, Result};
pub use handler::DependencyHandler;
pub use injector::DependencyInjector;
pub use introspect::{
    downcast, ConstructorDecl, DeclarationRegistry, FieldDecl, Instance, Introspector, MethodDecl,
    ParamDecl, RegistryBuilder, Scope, TypeDecl, TypeKey, TypeKind,
};
pub use marker::{AttrValue, MarkerDef, MarkerInstance, MarkerVocabulary, Role};
pub use processor::MarkerProcessor;
pub use proxy::{ProducerBinding, ProducerProxy};
pub use sort::{DependencyComparator, DependencySorter};
pub use value::{Literal, ScalarKind, ValueKind, ValueResolver};
