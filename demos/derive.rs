//! Example demonstrating the #[derive(Service)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use std::sync::Arc;
use yedi::{Args, Container, Scope, Service};

// Dependencies
struct Database {
    url: String,
}

struct Cache {
    size: usize,
}

struct Logger;

// Every named field is a constructor parameter
#[derive(Service)]
struct UserService {
    db: Arc<Database>,
    cache: Arc<Cache>,
    // Resolves to None when no Logger is registered
    logger: Option<Arc<Logger>>,
    // Not a parameter; uses Default
    #[service(default)]
    request_count: u64,
}

impl UserService {
    fn describe(&self) -> String {
        let logger_status = if self.logger.is_some() {
            "with logging"
        } else {
            "without logging"
        };
        format!(
            "UserService connected to {} with cache size {} ({}, requests: {})",
            self.db.url, self.cache.size, logger_status, self.request_count
        )
    }
}

// Nested injection, with a value the caller supplies
#[derive(Service)]
struct ApiController {
    user_service: Arc<UserService>,
    version: String,
}

fn main() {
    println!("=== yedi Derive Demo ===\n");

    let container = Container::new();
    container
        .provide_instance(Database {
            url: "postgres://localhost".into(),
        })
        .provide_instance(Cache { size: 1024 })
        .provide::<UserService>(Scope::Singleton);

    println!("UserService parameters: {:?}", UserService::PARAMETERS);

    let users = container.get::<UserService>().unwrap();
    println!("{}", users.describe());

    // Registering a Logger later does not change the cached singleton
    container.provide_fn(Scope::Singleton, || Logger);
    let again = container.get::<UserService>().unwrap();
    assert!(Arc::ptr_eq(&users, &again));

    // Constructor injection with a caller-supplied parameter
    let controller = container
        .inject_type::<ApiController>()
        .create(Args::new().with("version", "v2".to_string()))
        .unwrap();
    println!(
        "ApiController {} -> {}",
        controller.version,
        controller.user_service.describe()
    );

    println!("\n=== Demo Complete ===");
}
