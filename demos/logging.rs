//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```
//!
//! Set the level to TRACE to see every resolution:
//! ```bash
//! cargo run --example logging --features logging-pretty -- trace
//! ```

use std::sync::Arc;
use yedi::{Args, Container, Scope};

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct UserService {
    db: Arc<Database>,
}

struct Mailer;

fn main() {
    let trace = std::env::args().any(|arg| arg == "trace");

    // Uses JSON if logging-json is enabled, pretty otherwise
    if trace {
        yedi::logging::builder().trace().pretty().yedi_only().init();
    } else {
        yedi::logging::init();
    }

    println!("=== yedi Logging Demo ===\n");

    // Logs: "Creating new DI container"
    let container = Container::new();

    // Logs: "Registering provider"
    container
        .provide_instance(Database {
            url: "postgres://localhost/mydb".into(),
        })
        .provide_fn(Scope::Transient, |db: Arc<Database>| UserService { db });

    // Logs: "Replaced existing provider (last registration wins)"
    container.provide_fn(Scope::Singleton, |db: Arc<Database>| UserService { db });

    // Logs: "Singleton initializing on first access", then the cache hit
    let first = container.get::<UserService>().unwrap();
    let second = container.get::<UserService>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // Logs: "No provider registered"
    let missing = container.try_get::<Mailer>();
    assert!(missing.is_none());

    // Logs the binding of each injected parameter at TRACE
    let describe = container
        .inject(|users: Arc<UserService>, label: String| format!("{label}: {}", users.db.url))
        .named(["users", "label"]);
    let out = describe
        .call(Args::new().with("label", "primary".to_string()))
        .unwrap();
    println!("{out}");

    // Logs: "Container cleared - all providers and cached singletons removed"
    container.clear();

    println!("\n=== Demo Complete ===");
}
