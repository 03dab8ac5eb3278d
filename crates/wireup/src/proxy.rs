//! Producer-method override proxy
//!
//! The engine has no way to intercept arbitrary virtual calls, so the
//! dynamic-subclass proxy of reflective containers is rendered as an
//! explicit wrapper: the real instance plus a per-type dispatch table of
//! producer-method bindings. A call dispatched through the table first asks
//! the registry for the method's return type under its first declared alias
//! and only runs the real body when nothing is registered. This keeps
//! lazily-created configuration instances consistent with values registered
//! through other paths, such as a named override seeded before the type was
//! instantiated.

use crate::alias::DEFAULT_ALIAS;
use crate::error::{Error, Result};
use crate::handler::DependencyHandler;
use crate::introspect::{Instance, MethodDecl, TypeKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One producer method reachable through the proxy
#[derive(Clone)]
pub struct ProducerBinding {
    /// The producer declaration
    pub method: Arc<MethodDecl>,
    /// The method's declared return type
    pub return_type: TypeKey,
    /// Aliases the method declares, in order; empty means the default alias
    pub aliases: Vec<String>,
}

impl ProducerBinding {
    /// The alias consulted for an override
    pub fn primary_alias(&self) -> &str {
        self.aliases.first().map_or(DEFAULT_ALIAS, String::as_str)
    }
}

impl fmt::Debug for ProducerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerBinding")
            .field("method", &self.method.describe())
            .field("return_type", &self.return_type)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Wrapper around a lazily-created instance whose producer methods may be
/// overridden by already-registered values
pub struct ProducerProxy {
    owner: TypeKey,
    target: Instance,
    bindings: HashMap<String, ProducerBinding>,
}

impl ProducerProxy {
    pub(crate) fn new(owner: TypeKey, target: Instance, bindings: Vec<ProducerBinding>) -> Self {
        Self {
            owner,
            target,
            bindings: bindings
                .into_iter()
                .map(|b| (b.method.name.clone(), b))
                .collect(),
        }
    }

    /// Invoke a producer method through the dispatch table: a registered
    /// value for the method's return type wins over the method body
    pub fn invoke(&self, handler: &DependencyHandler, method: &str) -> Result<Instance> {
        let binding = self.bindings.get(method).ok_or_else(|| {
            Error::unknown_declaration(format!("{}::{method}", self.owner))
        })?;

        let alias = binding.primary_alias();
        if handler.has_instance(binding.return_type.id(), alias) {
            debug!(
                owner = %self.owner,
                method,
                alias,
                "producer overridden by registered instance"
            );
            return handler.instance_by_key(binding.return_type, alias);
        }

        let args = handler.resolve_parameters(&binding.method.params)?;
        let receiver = (!binding.method.is_static).then_some(&self.target);
        (binding.method.body)(receiver, &args)?.ok_or_else(|| {
            Error::internal(format!(
                "producer {} returned no value",
                binding.method.describe()
            ))
        })
    }
}

impl fmt::Debug for ProducerProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerProxy")
            .field("owner", &self.owner)
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
