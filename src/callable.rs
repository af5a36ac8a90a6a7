//! Callable shapes
//!
//! [`Callable`] covers free functions and closures, [`Method`] covers
//! functions whose first parameter is a [`Receiver`] (`&S` or `Arc<S>`).
//! Both are implemented for every `Fn` whose parameters implement [`Param`],
//! up to 12 parameters after the receiver. The marker type parameter only
//! exists to let the compiler pick the implementation from the function's
//! own signature.

use crate::signature::{Dependencies, Param};
use std::sync::Arc;

/// A free function or closure whose parameters can be injected.
///
/// Async functions are callables too; their output is the future.
pub trait Callable<Marker>: Send + Sync + 'static {
    /// The parameter list
    type Dependencies: Dependencies;
    /// The return type
    type Output;

    /// Call with bound parameters
    fn invoke(&self, dependencies: Self::Dependencies) -> Self::Output;
}

/// How a method takes its `self`.
///
/// The receiver is passed by value, so `async fn run(&self, ..)` works: its
/// future borrows the `&S` it was handed.
pub trait Receiver {
    /// The type the method is defined on
    type Target: ?Sized + 'static;
}

impl<S: ?Sized + 'static> Receiver for &S {
    type Target = S;
}

impl<S: ?Sized + 'static> Receiver for Arc<S> {
    type Target = S;
}

/// A method whose parameters after the receiver can be injected.
///
/// The receiver is never part of the parameter list.
pub trait Method<Recv: Receiver, Marker>: Send + Sync + 'static {
    /// The parameter list after the receiver
    type Dependencies: Dependencies;
    /// The return type
    type Output;

    /// Call on `receiver` with bound parameters
    fn invoke(&self, receiver: Recv, dependencies: Self::Dependencies) -> Self::Output;
}

macro_rules! impl_callable {
    ($($P:ident),*) => {
        impl<Func, Out, $($P: Param),*> Callable<fn($($P,)*) -> Out> for Func
        where
            Func: Fn($($P),*) -> Out + Send + Sync + 'static,
        {
            type Dependencies = ($($P,)*);
            type Output = Out;

            #[inline]
            #[allow(non_snake_case)]
            fn invoke(&self, ($($P,)*): Self::Dependencies) -> Out {
                (self)($($P),*)
            }
        }

        impl<Func, Recv, Out, $($P: Param),*> Method<Recv, fn(Recv $(, $P)*) -> Out> for Func
        where
            Recv: Receiver,
            Func: Fn(Recv $(, $P)*) -> Out + Send + Sync + 'static,
        {
            type Dependencies = ($($P,)*);
            type Output = Out;

            #[inline]
            #[allow(non_snake_case)]
            fn invoke(&self, receiver: Recv, ($($P,)*): Self::Dependencies) -> Out {
                (self)(receiver $(, $P)*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A);
impl_callable!(A, B);
impl_callable!(A, B, C);
impl_callable!(A, B, C, D);
impl_callable!(A, B, C, D, E);
impl_callable!(A, B, C, D, E, F);
impl_callable!(A, B, C, D, E, F, G);
impl_callable!(A, B, C, D, E, F, G, H);
impl_callable!(A, B, C, D, E, F, G, H, I);
impl_callable!(A, B, C, D, E, F, G, H, I, J);
impl_callable!(A, B, C, D, E, F, G, H, I, J, K);
impl_callable!(A, B, C, D, E, F, G, H, I, J, K, L);

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter {
        greeting: &'static str,
    }

    impl Greeter {
        fn greet(&self, name: String, times: usize) -> String {
            vec![format!("{} {name}", self.greeting); times].join(", ")
        }

        async fn greet_later(&self, name: String) -> String {
            format!("{} {name}", self.greeting)
        }

        fn shout(self: Arc<Self>) -> String {
            self.greeting.to_uppercase()
        }
    }

    fn call<M, F: Callable<M>>(f: &F, deps: F::Dependencies) -> F::Output {
        f.invoke(deps)
    }

    fn call_method<R: Receiver, M, F: Method<R, M>>(f: &F, r: R, deps: F::Dependencies) -> F::Output {
        f.invoke(r, deps)
    }

    #[test]
    fn test_closure_callable() {
        let add = |a: u32, b: u32| a + b;
        assert_eq!(call(&add, (2, 3)), 5);

        let nothing = || "done";
        assert_eq!(call(&nothing, ()), "done");
    }

    #[test]
    fn test_fn_item_callable() {
        fn describe(value: Arc<String>, suffix: Option<String>) -> String {
            format!("{value}{}", suffix.unwrap_or_default())
        }

        assert_eq!(call(&describe, (Arc::new("a".into()), None)), "a");
        assert_eq!(call(&describe, (Arc::new("a".into()), Some("b".into()))), "ab");
    }

    #[test]
    fn test_method_receiver_is_separate() {
        let greeter = Greeter { greeting: "hi" };
        let out = call_method(&Greeter::greet, &greeter, ("bob".into(), 2));
        assert_eq!(out, "hi bob, hi bob");

        let out = call_method(&Greeter::shout, Arc::new(greeter), ());
        assert_eq!(out, "HI");
    }

    #[tokio::test]
    async fn test_async_method_borrows_receiver() {
        let greeter = Greeter { greeting: "hey" };
        let future = call_method(&Greeter::greet_later, &greeter, ("ann".into(),));
        assert_eq!(future.await, "hey ann");
    }

    #[tokio::test]
    async fn test_async_callable_returns_future() {
        async fn double(value: u64) -> u64 {
            value * 2
        }

        let future = call(&double, (21,));
        assert_eq!(future.await, 42);
    }
}
