//! Full resolution passes: phase ordering, producer overrides, aliases,
//! scoping and literal values

mod common;

use common::{
    component, configuration, counting_ctor, inject, injectable, simple_ctor, slot_setter,
    AuditService, Database, Extra, Logger,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wireup::{
    downcast, DeclarationRegistry, DependencyInjector, Error, FieldDecl, Instance, MarkerDef,
    MarkerInstance, MarkerVocabulary, MethodDecl, ParamDecl, Role, ScalarKind, Scope, TypeKey,
    ValueKind,
};

fn database_producer(name: &str, url: &'static str, aliases: &[&str]) -> MethodDecl {
    MethodDecl::new(name, move |_, _| {
        Ok(Some(Arc::new(Database {
            url: url.to_string(),
        }) as Instance))
    })
    .returns(TypeKey::of::<Database>())
    .marker(injectable(aliases))
}

struct AppConfig;

#[test]
fn test_full_pass_runs_all_five_phases() {
    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(database_producer("database", "postgres://localhost", &["db"]))
        .register()
        .concrete_type::<Logger>("app")
        .constructor(simple_ctor(|| Logger))
        .register()
        .concrete_type::<Extra>("app")
        .constructor(simple_ctor(|| Extra))
        .register()
        .concrete_type::<AuditService>("app")
        .marker(component())
        .constructor(simple_ctor(AuditService::empty).marker(inject()))
        .field(
            FieldDecl::new("logger", TypeKey::of::<Logger>())
                .marker(inject())
                .setter(slot_setter::<AuditService, Logger>(|s| &s.logger)),
        )
        .method(
            MethodDecl::new("set_extra", |receiver, args| {
                let receiver =
                    receiver.ok_or_else(|| Error::internal("missing receiver"))?;
                let service = downcast::<AuditService>(Arc::clone(receiver))?;
                *service.extra.lock().unwrap() = Some(downcast::<Extra>(Arc::clone(&args[0]))?);
                Ok(None)
            })
            .param(ParamDecl::dependency("extra", TypeKey::of::<Extra>()))
            .marker(inject()),
        )
        .field(
            FieldDecl::new("year", TypeKey::of::<i32>())
                .kind(ValueKind::Scalar(ScalarKind::I32))
                .marker(MarkerInstance::of_role(Role::Value).attr("value", "2018"))
                .setter(|receiver, value| {
                    let receiver =
                        receiver.ok_or_else(|| Error::internal("missing receiver"))?;
                    let service = downcast::<AuditService>(Arc::clone(receiver))?;
                    *service.year.lock().unwrap() = *downcast::<i32>(value)?;
                    Ok(())
                }),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    let database: Arc<Database> = injector.instance_with_alias("db").unwrap();
    assert_eq!(database.url, "postgres://localhost");

    let service: Arc<AuditService> = injector.instance_of().unwrap();
    assert!(service.logger.lock().unwrap().is_some());
    assert!(service.extra.lock().unwrap().is_some());
    assert_eq!(*service.year.lock().unwrap(), 2018);
}

#[test]
fn test_producer_registers_under_every_declared_alias() {
    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(database_producer(
            "database",
            "postgres://localhost",
            &["primary", "replica"],
        ))
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    let primary: Arc<Database> = injector.instance_with_alias("primary").unwrap();
    let replica: Arc<Database> = injector.instance_with_alias("replica").unwrap();
    assert!(Arc::ptr_eq(&primary, &replica));
}

#[test]
fn test_preregistered_instance_overrides_the_producer_body() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(
            MethodDecl::new("database", move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Arc::new(Database {
                    url: "from-body".to_string(),
                }) as Instance))
            })
            .returns(TypeKey::of::<Database>())
            .marker(injectable(&["db"])),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    let seeded = Arc::new(Database {
        url: "seeded".to_string(),
    });
    injector.register_arc(Arc::clone(&seeded), &["db"]);

    injector.resolve(&Scope::everything()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let resolved: Arc<Database> = injector.instance_with_alias("db").unwrap();
    assert!(Arc::ptr_eq(&resolved, &seeded));
}

#[test]
fn test_producer_value_of_goes_through_the_override_dispatch() {
    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(database_producer("database", "from-body", &["db"]))
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    let seeded = Arc::new(Database {
        url: "seeded".to_string(),
    });
    injector.register_arc(Arc::clone(&seeded), &["db"]);

    let value = injector.producer_value_of::<AppConfig>("database").unwrap();
    let database = downcast::<Database>(value).unwrap();
    assert!(Arc::ptr_eq(&database, &seeded));
}

#[test]
fn test_producers_run_in_field_dependency_order() {
    struct Session;
    struct Pool;

    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let session_log = Arc::clone(&log);
    let pool_log = Arc::clone(&log);

    // Session structurally depends on Pool, so the pool producer must run
    // first even though the session producer is declared first.
    let registry = DeclarationRegistry::builder()
        .concrete_type::<Session>("app")
        .field(FieldDecl::new("pool", TypeKey::of::<Pool>()))
        .register()
        .concrete_type::<Pool>("app")
        .register()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(
            MethodDecl::new("session", move |_, _| {
                session_log.lock().unwrap().push("session");
                Ok(Some(Arc::new(Session) as Instance))
            })
            .returns(TypeKey::of::<Session>())
            .marker(injectable(&[])),
        )
        .method(
            MethodDecl::new("pool", move |_, _| {
                pool_log.lock().unwrap().push("pool");
                Ok(Some(Arc::new(Pool) as Instance))
            })
            .returns(TypeKey::of::<Pool>())
            .marker(injectable(&[])),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["pool", "session"]);
}

#[test]
fn test_failed_phase_keeps_earlier_registrations() {
    struct Missing;
    struct Broken {
        slot: Mutex<Option<Arc<Missing>>>,
    }

    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(database_producer("database", "postgres://localhost", &["db"]))
        .register()
        .concrete_type::<Broken>("app")
        .marker(component())
        .constructor(simple_ctor(|| Broken {
            slot: Mutex::new(None),
        }))
        .field(
            // Missing is never registered, so this injection fails.
            FieldDecl::new("slot", TypeKey::of::<Missing>())
                .marker(inject())
                .setter(slot_setter::<Broken, Missing>(|b| &b.slot)),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    let err = injector.resolve(&Scope::everything()).unwrap_err();
    assert!(matches!(err, Error::Processing { ref phase, .. } if phase == "field-injection"));

    // The producer phase completed before the failure.
    let database: Arc<Database> = injector.instance_with_alias("db").unwrap();
    assert_eq!(database.url, "postgres://localhost");

    // The failing field was left unassigned.
    let broken: Arc<Broken> = injector.instance_of().unwrap();
    assert!(broken.slot.lock().unwrap().is_none());
}

#[test]
fn test_scope_limits_which_declarations_are_processed() {
    struct AppWidget;
    struct OtherWidget;

    let app_count = Arc::new(AtomicUsize::new(0));
    let other_count = Arc::new(AtomicUsize::new(0));

    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppWidget>("app")
        .marker(component())
        .constructor(counting_ctor(Arc::clone(&app_count), || AppWidget).marker(inject()))
        .register()
        .concrete_type::<OtherWidget>("other")
        .marker(component())
        .constructor(counting_ctor(Arc::clone(&other_count), || OtherWidget).marker(inject()))
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::module("app")).unwrap();

    assert_eq!(app_count.load(Ordering::SeqCst), 1);
    assert_eq!(other_count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_static_producer_runs_without_a_receiver() {
    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .method(
            MethodDecl::new("database", |receiver, _| {
                assert!(receiver.is_none());
                Ok(Some(Arc::new(Database {
                    url: "static".to_string(),
                }) as Instance))
            })
            .returns(TypeKey::of::<Database>())
            .marker(injectable(&[]))
            .static_member(),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    let database: Arc<Database> = injector.instance_of().unwrap();
    assert_eq!(database.url, "static");
}

#[test]
fn test_inject_members_on_non_component_types_are_skipped() {
    struct Plain {
        logger: Mutex<Option<Arc<Logger>>>,
    }

    let created = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);

    // Plain carries no Component marker, so none of its Inject-marked
    // members count as injection points.
    let registry = DeclarationRegistry::builder()
        .concrete_type::<Logger>("app")
        .constructor(simple_ctor(|| Logger))
        .register()
        .concrete_type::<Plain>("app")
        .constructor(
            counting_ctor(Arc::clone(&created), || Plain {
                logger: Mutex::new(None),
            })
            .marker(inject()),
        )
        .field(
            FieldDecl::new("logger", TypeKey::of::<Logger>())
                .marker(inject())
                .setter(slot_setter::<Plain, Logger>(|p| &p.logger)),
        )
        .method(
            MethodDecl::new("set_logger", move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .marker(inject()),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    // Nothing touched Plain: no constructor phase, no field assignment, no
    // method call, not even a lazy creation on the way.
    assert_eq!(created.load(Ordering::SeqCst), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let plain: Arc<Plain> = injector.instance_of().unwrap();
    assert!(plain.logger.lock().unwrap().is_none());
}

#[test]
fn test_producers_on_non_configuration_types_are_skipped() {
    struct Services;

    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);

    // Services is a component, not a configuration, so its Injectable
    // method is not an eligible producer.
    let registry = DeclarationRegistry::builder()
        .concrete_type::<Services>("app")
        .marker(component())
        .constructor(simple_ctor(|| Services))
        .method(
            MethodDecl::new("database", move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Arc::new(Database {
                    url: "ineligible".to_string(),
                }) as Instance))
            })
            .returns(TypeKey::of::<Database>())
            .marker(injectable(&["db"])),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(injector.instance_with_alias::<Database>("db").is_err());
}

#[test]
fn test_custom_markers_carry_their_declared_roles() {
    struct Repository {
        logger: Mutex<Option<Arc<Logger>>>,
    }

    let vocabulary = MarkerVocabulary::new()
        .define(MarkerDef::new("Service").meta(MarkerInstance::of_role(Role::Component)))
        .define(
            MarkerDef::new("Provides")
                .meta(MarkerInstance::of_role(Role::Injectable).attr("attribute", "name")),
        );

    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(
            MethodDecl::new("database", |_, _| {
                Ok(Some(Arc::new(Database {
                    url: "named".to_string(),
                }) as Instance))
            })
            .returns(TypeKey::of::<Database>())
            .marker(MarkerInstance::new("Provides").attr("name", "db")),
        )
        .register()
        .concrete_type::<Logger>("app")
        .constructor(simple_ctor(|| Logger))
        .register()
        .concrete_type::<Repository>("app")
        .marker(MarkerInstance::new("Service"))
        .constructor(simple_ctor(|| Repository {
            logger: Mutex::new(None),
        }))
        .field(
            FieldDecl::new("logger", TypeKey::of::<Logger>())
                .marker(inject())
                .setter(slot_setter::<Repository, Logger>(|r| &r.logger)),
        )
        .register()
        .build();

    let injector = DependencyInjector::with_vocabulary(Arc::new(registry), vocabulary);
    injector.resolve(&Scope::everything()).unwrap();

    let database: Arc<Database> = injector.instance_with_alias("db").unwrap();
    assert_eq!(database.url, "named");

    let repository: Arc<Repository> = injector.instance_of().unwrap();
    assert!(repository.logger.lock().unwrap().is_some());
}

#[test]
fn test_field_alias_selects_the_named_instance() {
    struct Consumer {
        database: Mutex<Option<Arc<Database>>>,
    }

    let registry = DeclarationRegistry::builder()
        .concrete_type::<AppConfig>("app")
        .marker(configuration())
        .constructor(simple_ctor(|| AppConfig))
        .method(database_producer("primary", "primary-url", &["primary"]))
        .method(database_producer("backup", "backup-url", &["backup"]))
        .register()
        .concrete_type::<Consumer>("app")
        .marker(component())
        .constructor(simple_ctor(|| Consumer {
            database: Mutex::new(None),
        }))
        .field(
            FieldDecl::new("database", TypeKey::of::<Database>())
                .marker(inject())
                .marker(MarkerInstance::of_role(Role::Alias).attr("value", "backup"))
                .setter(slot_setter::<Consumer, Database>(|c| &c.database)),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    let consumer: Arc<Consumer> = injector.instance_of().unwrap();
    let database = consumer.database.lock().unwrap().clone().unwrap();
    assert_eq!(database.url, "backup-url");
}

#[test]
fn test_value_fields_parse_scalars_and_arrays() {
    struct Settings {
        ratio: Mutex<f32>,
        date: Mutex<Vec<i16>>,
    }

    let registry = DeclarationRegistry::builder()
        .concrete_type::<Settings>("app")
        .constructor(simple_ctor(|| Settings {
            ratio: Mutex::new(0.0),
            date: Mutex::new(Vec::new()),
        }))
        .field(
            FieldDecl::new("ratio", TypeKey::of::<f32>())
                .kind(ValueKind::Scalar(ScalarKind::F32))
                .marker(MarkerInstance::of_role(Role::Value).attr("value", "2.71f"))
                .setter(|receiver, value| {
                    let receiver =
                        receiver.ok_or_else(|| Error::internal("missing receiver"))?;
                    let settings = downcast::<Settings>(Arc::clone(receiver))?;
                    *settings.ratio.lock().unwrap() = *downcast::<f32>(value)?;
                    Ok(())
                }),
        )
        .field(
            FieldDecl::new("date", TypeKey::of::<Vec<i16>>())
                .kind(ValueKind::Array(ScalarKind::I16))
                .marker(
                    MarkerInstance::of_role(Role::Value)
                        .attr("value", vec!["2018".to_string(), "12".to_string(), "26".to_string()]),
                )
                .setter(|receiver, value| {
                    let receiver =
                        receiver.ok_or_else(|| Error::internal("missing receiver"))?;
                    let settings = downcast::<Settings>(Arc::clone(receiver))?;
                    *settings.date.lock().unwrap() = downcast::<Vec<i16>>(value)?.as_ref().clone();
                    Ok(())
                }),
        )
        .register()
        .build();

    let injector = DependencyInjector::new(Arc::new(registry));
    injector.resolve(&Scope::everything()).unwrap();

    let settings: Arc<Settings> = injector.instance_of().unwrap();
    assert!((*settings.ratio.lock().unwrap() - 2.71).abs() < f32::EPSILON);
    assert_eq!(*settings.date.lock().unwrap(), vec![2018, 12, 26]);
}
