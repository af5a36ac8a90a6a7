//! Process-wide default container

use crate::Container;
use once_cell::sync::Lazy;

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// The process-wide default container.
///
/// Created on first use and never dropped. It has the full [`Container`]
/// surface; call [`Container::clear`] to reset it between tests.
///
/// # Examples
///
/// ```rust
/// use yedi::{Scope, global};
///
/// struct AppName(&'static str);
///
/// global().provide_fn(Scope::Singleton, || AppName("demo"));
/// assert_eq!(global().get::<AppName>().unwrap().0, "demo");
/// ```
#[inline]
pub fn global() -> &'static Container {
    &GLOBAL
}
