//! # yedi - Type-Directed Dependency Injection for Rust
//!
//! A thread-safe dependency injection container that resolves constructor,
//! factory, function and method parameters by their declared types.
//!
//! ## Features
//!
//! - 🔒 **Type-directed** - Parameters are resolved by type; no string keys
//! - 🏭 **Constructors and factories** - Register types, closures or pre-built values
//! - 🔌 **Interfaces** - Register an implementation under a trait object key
//! - 💉 **Injection** - Wrap sync or async functions, methods and constructors
//! - ♻️ **Scopes** - Singleton (one shared instance) or transient (fresh every time)
//! - 🔄 **Cycle detection** - Circular dependencies fail fast instead of overflowing
//! - ⚡ **Lock-free reads** - Uses `DashMap`; each singleton is built at most once
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use yedi::{Container, Scope, Service};
//! use std::sync::{Arc, Mutex};
//!
//! struct Database;
//!
//! #[derive(Default)]
//! struct Logger {
//!     entries: Mutex<Vec<String>>,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//!     logger: Arc<Logger>,
//! }
//!
//! impl Service for UserService {
//!     type Dependencies = (Arc<Database>, Arc<Logger>);
//!     const PARAMETERS: &'static [&'static str] = &["db", "logger"];
//!
//!     fn create((db, logger): Self::Dependencies) -> Self {
//!         UserService { db, logger }
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .provide_fn(Scope::Transient, || Database)
//!     .provide_fn(Scope::Transient, Logger::default)
//!     .provide::<UserService>(Scope::Transient);
//!
//! // Dependencies are resolved depth-first; the result is an Arc<UserService>
//! let users = container.get::<UserService>().unwrap();
//! users.logger.entries.lock().unwrap().push("ready".into());
//! ```
//!
//! ## Scopes
//!
//! ```rust
//! use yedi::{Container, Scope};
//! use std::sync::Arc;
//!
//! struct Config { debug: bool }
//! struct RequestId(u64);
//!
//! let container = Container::new();
//!
//! // Singleton - one instance, shared until clear()
//! container.provide_fn(Scope::Singleton, || Config { debug: true });
//!
//! // Transient (the default scope) - new instance every time
//! container.provide_fn(Scope::default(), || RequestId(7));
//!
//! let a = container.get::<Config>().unwrap();
//! let b = container.get::<Config>().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! let a = container.get::<RequestId>().unwrap();
//! let b = container.get::<RequestId>().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! ```
//!
//! ## Injection
//!
//! ```rust
//! use yedi::{Args, Container, Scope};
//! use std::sync::Arc;
//!
//! struct Database { url: String }
//!
//! fn describe(db: Arc<Database>, label: String) -> String {
//!     format!("{label}: {}", db.url)
//! }
//!
//! let container = Container::new();
//! container.provide_instance(Database { url: "postgres://localhost".into() });
//!
//! // Caller-supplied arguments always win over injection
//! let describe = container.inject(describe).named(["db", "label"]);
//! let out = describe.call(Args::new().with("label", "primary".to_string())).unwrap();
//! assert_eq!(out, "primary: postgres://localhost");
//! ```

mod args;
mod callable;
mod container;
mod error;
mod global;
mod inject;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod registry;
mod resolver;
mod signature;

pub use args::*;
pub use callable::*;
pub use container::*;
pub use error::*;
pub use global::*;
pub use inject::*;
pub use provider::*;
pub use registry::*;
pub use resolver::*;
pub use signature::*;

/// Derive [`Service`](trait@Service) from a struct's fields
#[cfg(feature = "derive")]
pub use yedi_derive::Service;

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Args, Container, DiError, Injectable, Key, Result, Scope, Service, Untyped, global,
    };
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Database;

    impl Database {
        fn query(&self, sql: &str) -> String {
            format!("rows for [{sql}]")
        }
    }

    #[derive(Default)]
    struct Logger {
        entries: Mutex<Vec<String>>,
    }

    impl Logger {
        fn log(&self, message: String) {
            self.entries.lock().unwrap().push(message);
        }

        fn count(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    struct UserService {
        db: Arc<Database>,
        logger: Arc<Logger>,
    }

    impl Service for UserService {
        type Dependencies = (Arc<Database>, Arc<Logger>);
        const PARAMETERS: &'static [&'static str] = &["db", "logger"];

        fn create((db, logger): Self::Dependencies) -> Self {
            UserService { db, logger }
        }
    }

    impl UserService {
        fn get_user(&self, id: u32) -> String {
            self.logger.log(format!("Getting user {id}"));
            self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
        }
    }

    fn container() -> Container {
        let container = Container::new();
        container
            .provide_fn(Scope::Transient, || Database)
            .provide_fn(Scope::Transient, Logger::default)
            .provide::<UserService>(Scope::Transient);
        container
    }

    #[test]
    fn test_user_service_scenario() {
        let container = container();
        let service = container.get::<UserService>().unwrap();

        let result = service.get_user(123);
        assert!(result.contains("id = 123"));
        assert_eq!(service.logger.count(), 1);
    }

    #[test]
    fn test_transient_dependencies_are_fresh() {
        let container = container();
        let a = container.get::<UserService>().unwrap();
        let b = container.get::<UserService>().unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a.logger, &b.logger));
    }

    #[test]
    fn test_singleton_dependency_is_shared() {
        let container = container();
        container.provide_fn(Scope::Singleton, Logger::default);

        let a = container.get::<UserService>().unwrap();
        let b = container.get::<UserService>().unwrap();
        assert!(Arc::ptr_eq(&a.logger, &b.logger));
    }

    #[test]
    fn test_last_registration_wins() {
        static BUILT: AtomicU32 = AtomicU32::new(0);

        struct Port(u16);

        let container = Container::new();
        container.provide_fn(Scope::Singleton, || Port(80));
        assert_eq!(container.get::<Port>().unwrap().0, 80);

        container.provide_fn(Scope::Singleton, || {
            BUILT.fetch_add(1, Ordering::SeqCst);
            Port(8080)
        });
        assert_eq!(container.get::<Port>().unwrap().0, 8080);
        assert_eq!(container.get::<Port>().unwrap().0, 8080);
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_not_found_error() {
        let container = Container::new();
        let err = container.get::<Database>().unwrap_err();
        assert!(err.is_no_provider());
        assert!(err.to_string().contains("No provider registered"));
    }

    #[test]
    fn test_clear_removes_singletons() {
        let container = Container::new();
        container.provide_fn(Scope::Singleton, || Database);
        container.get::<Database>().unwrap();

        container.clear();
        assert!(container.get::<Database>().unwrap_err().is_no_provider());
    }
}
