use iotlogic_di::{
    deps, ContainerOptions, DiError, Injectable, Key, MembersInjector, Resolver, ServiceCollection,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct LocationManager;
struct Context;

trait NotificationSink: Send + Sync {
    fn channel(&self) -> &'static str;
}

struct PushSink;

impl NotificationSink for PushSink {
    fn channel(&self) -> &'static str {
        "push"
    }
}

/// Created by the platform, never by the container.
#[derive(Default)]
struct GeofenceBroadcastReceiver {
    location_manager: Option<Arc<LocationManager>>,
    app_context: Option<Arc<Context>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl Injectable for GeofenceBroadcastReceiver {
    fn members_injector() -> MembersInjector<Self> {
        MembersInjector::<Self>::new()
            .field::<LocationManager, _>("location_manager", |r, v| r.location_manager = Some(v))
            .named_field::<Context, _>("app_context", "application_context", |r, v| r.app_context = Some(v))
            .trait_field::<dyn NotificationSink, _>("sink", |r, v| r.sink = Some(v))
    }
}

fn receiver_services() -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<LocationManager, _>(deps![], |_| Ok(LocationManager));
    sc.add_named_singleton("application_context", Context);
    sc.add_singleton_trait::<dyn NotificationSink>(Arc::new(PushSink));
    sc
}

#[test]
fn test_receiver_gets_location_manager_singleton() {
    let assignments = Arc::new(AtomicUsize::new(0));
    let counter = assignments.clone();

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<LocationManager, _>(deps![], |_| Ok(LocationManager));
    sc.add_members_injector(MembersInjector::<GeofenceBroadcastReceiver>::new().field::<LocationManager, _>(
        "location_manager",
        move |r, v| {
            counter.fetch_add(1, Ordering::SeqCst);
            r.location_manager = Some(v);
        },
    ));
    let sp = sc.build().unwrap();

    let mut receiver = GeofenceBroadcastReceiver::default();
    sp.inject_members(&mut receiver).unwrap();

    let injected = receiver.location_manager.expect("field injected");
    assert!(Arc::ptr_eq(&injected, &sp.get_required::<LocationManager>()));
    assert_eq!(assignments.load(Ordering::SeqCst), 1);
}

#[test]
fn test_injectable_declares_its_own_sites() {
    let mut sc = receiver_services();
    sc.add_injectable::<GeofenceBroadcastReceiver>();
    let sp = sc.build().unwrap();

    let mut receiver = GeofenceBroadcastReceiver::default();
    sp.inject_members(&mut receiver).unwrap();

    assert!(receiver.location_manager.is_some());
    let ctx = receiver.app_context.expect("qualified field injected");
    assert!(Arc::ptr_eq(&ctx, &sp.get_named::<Context>("application_context").unwrap()));
    assert_eq!(receiver.sink.expect("trait field injected").channel(), "push");
}

#[test]
fn test_missing_injector_is_an_error() {
    let sp = receiver_services().build().unwrap();
    let mut receiver = GeofenceBroadcastReceiver::default();

    assert!(matches!(
        sp.inject_members(&mut receiver),
        Err(DiError::NoMembersInjector(name)) if name.contains("GeofenceBroadcastReceiver")
    ));
}

#[test]
fn test_duplicate_injector_is_reported_by_build() {
    let mut sc = receiver_services();
    sc.add_injectable::<GeofenceBroadcastReceiver>();
    sc.add_injectable::<GeofenceBroadcastReceiver>();

    assert!(matches!(sc.build(), Err(DiError::DuplicateMembersInjector(_))));
}

#[test]
fn test_failed_site_leaves_target_untouched() {
    let mut sc = ServiceCollection::with_options(ContainerOptions::default().validate_on_build(false));
    sc.add_singleton_factory::<LocationManager, _>(deps![], |_| Ok(LocationManager));
    sc.add_injectable::<GeofenceBroadcastReceiver>();
    let sp = sc.build().unwrap();

    let mut receiver = GeofenceBroadcastReceiver::default();
    let err = sp.inject_members(&mut receiver).unwrap_err();

    assert!(matches!(err, DiError::Unresolved { key, .. } if key == Key::named::<Context>("application_context")));
    // location_manager resolved fine but was never assigned
    assert!(receiver.location_manager.is_none());
}

#[test]
fn test_scope_injects_scoped_sites() {
    struct PairingSession;

    #[derive(Default)]
    struct PairingActivity {
        session: Option<Arc<PairingSession>>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<PairingSession, _>(deps![], |_| Ok(PairingSession));
    let sp = sc.build().unwrap();

    let injector =
        MembersInjector::<PairingActivity>::new().field::<PairingSession, _>("session", |a, v| a.session = Some(v));

    let scope = sp.create_scope();
    let mut activity = PairingActivity::default();
    scope.inject_members_with(&mut activity, &injector).unwrap();
    assert!(Arc::ptr_eq(
        activity.session.as_ref().unwrap(),
        &scope.get_required::<PairingSession>()
    ));

    // The root cannot see scoped bindings
    let mut orphan = PairingActivity::default();
    assert!(matches!(
        sp.inject_members_with(&mut orphan, &injector),
        Err(DiError::WrongLifetime { .. })
    ));
}

#[test]
fn test_inject_rejects_misaligned_values() {
    let injector = GeofenceBroadcastReceiver::members_injector();
    assert_eq!(injector.sites().len(), 3);
    assert_eq!(injector.sites()[1].key, Key::named::<Context>("application_context"));

    let mut receiver = GeofenceBroadcastReceiver::default();
    let err = injector.inject(&mut receiver, Vec::new()).unwrap_err();
    assert!(matches!(err, DiError::ArgumentOutOfRange { index: 0, declared: 3 }));
    assert!(receiver.location_manager.is_none());
}
