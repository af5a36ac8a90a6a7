//! `#[derive(Service)]`

#![cfg(feature = "derive")]

use std::sync::Arc;
use yedi::{Args, CallableKind, Container, Scope, Service, Signature};

struct Database;

struct Cache;

#[derive(Service)]
struct UserService {
    db: Arc<Database>,
    cache: Option<Arc<Cache>>,
    region: String,
    #[service(default)]
    requests: u64,
}

#[derive(Service)]
struct Clock;

#[test]
fn test_parameters_follow_fields() {
    assert_eq!(UserService::PARAMETERS, &["db", "cache", "region"]);
    assert!(Clock::PARAMETERS.is_empty());

    let signature = Signature::constructor::<UserService>();
    assert_eq!(signature.kind(), CallableKind::Constructor);
    assert_eq!(signature.len(), 3);
    assert!(signature.parameters()[1].is_optional());
    assert_eq!(signature.position("region"), Some(2));
}

#[test]
fn test_derived_service_resolves() {
    let container = Container::new();
    container
        .provide::<Clock>(Scope::Singleton)
        .provide_fn(Scope::Singleton, || Database)
        .provide_instance("eu-west".to_string())
        .provide::<UserService>(Scope::Transient);

    let service = container.get::<UserService>().unwrap();
    assert!(Arc::ptr_eq(&service.db, &container.get::<Database>().unwrap()));
    assert!(service.cache.is_none());
    assert_eq!(service.region, "eu-west");
    assert_eq!(service.requests, 0);
    assert!(container.get::<Clock>().is_ok());
}

#[test]
fn test_derived_service_with_caller_arguments() {
    let container = Container::new();
    container
        .provide_fn(Scope::Singleton, || Database)
        .provide_fn(Scope::Singleton, || Cache);

    let service = container
        .inject_type::<UserService>()
        .create(Args::new().with("region", "us-east".to_string()))
        .unwrap();

    assert!(service.cache.is_some());
    assert_eq!(service.region, "us-east");
}
