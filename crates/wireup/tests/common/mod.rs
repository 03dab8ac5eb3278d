//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wireup::{
    downcast, AttrValue, ConstructorDecl, Error, Instance, MarkerInstance, Result, Role,
};

pub struct Logger;

pub struct Database {
    pub url: String,
}

pub struct Extra;

/// Component with one injectable member of each shape
pub struct AuditService {
    pub logger: Mutex<Option<Arc<Logger>>>,
    pub extra: Mutex<Option<Arc<Extra>>>,
    pub year: Mutex<i32>,
}

impl AuditService {
    pub fn empty() -> Self {
        Self {
            logger: Mutex::new(None),
            extra: Mutex::new(None),
            year: Mutex::new(0),
        }
    }
}

pub fn component() -> MarkerInstance {
    MarkerInstance::of_role(Role::Component)
}

pub fn configuration() -> MarkerInstance {
    MarkerInstance::of_role(Role::Configuration)
}

pub fn inject() -> MarkerInstance {
    MarkerInstance::of_role(Role::Inject)
}

/// An Injectable marker declaring the given aliases (none means the default)
pub fn injectable(aliases: &[&str]) -> MarkerInstance {
    let marker = MarkerInstance::of_role(Role::Injectable);
    match aliases {
        [] => marker,
        [one] => marker.attr("alias", *one),
        many => marker.attr("alias", AttrValue::list(many.iter().copied())),
    }
}

/// Zero-argument constructor around a plain factory function
pub fn simple_ctor<T, F>(make: F) -> ConstructorDecl
where
    T: Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    ConstructorDecl::new(move |_| Ok(Arc::new(make()) as Instance))
}

/// Zero-argument constructor that counts invocations
pub fn counting_ctor<T, F>(counter: Arc<AtomicUsize>, make: F) -> ConstructorDecl
where
    T: Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    ConstructorDecl::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(make()) as Instance)
    })
}

/// Field assignment body storing into a `Mutex<Option<Arc<V>>>` slot
pub fn slot_setter<T, V>(
    slot: fn(&T) -> &Mutex<Option<Arc<V>>>,
) -> impl Fn(Option<&Instance>, Instance) -> Result<()> + Send + Sync + 'static
where
    T: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    move |receiver, value| {
        let receiver = receiver.ok_or_else(|| Error::internal("missing receiver"))?;
        let target = downcast::<T>(Arc::clone(receiver))?;
        *slot(&target).lock().unwrap() = Some(downcast::<V>(value)?);
        Ok(())
    }
}
