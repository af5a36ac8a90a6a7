//! Derive macros for yedi
//!
//! `#[derive(Service)]` makes a struct's constructor inspectable: every
//! named field becomes a constructor parameter, in field order and under
//! its field name.
//!
//! # Example
//!
//! ```rust,ignore
//! use yedi::{Container, Scope, Service};
//! use std::sync::Arc;
//!
//! struct Database;
//! struct Logger;
//!
//! #[derive(Service)]
//! struct UserService {
//!     db: Arc<Database>,
//!     logger: Arc<Logger>,
//!     // Optional dependencies resolve to None when nothing is registered
//!     cache: Option<Arc<Cache>>,
//!     // Not a parameter; filled with Default::default()
//!     #[service(default)]
//!     requests: u64,
//! }
//!
//! let container = Container::new();
//! container.provide::<UserService>(Scope::Transient);
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

/// How a field is filled by the generated constructor
enum FieldKind {
    /// A constructor parameter
    Parameter,
    /// `Default::default()`
    Default,
}

/// Parse `#[service(...)]` attributes on a field
fn field_kind(attrs: &[Attribute]) -> syn::Result<FieldKind> {
    let mut kind = FieldKind::Parameter;

    for attr in attrs {
        if !attr.path().is_ident("service") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                kind = FieldKind::Default;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }

    Ok(kind)
}

/// Derive macro for the `Service` trait.
///
/// # Attributes
///
/// - `#[service(default)]` - Fill the field with `Default::default()`
///   instead of taking it as a constructor parameter.
///
/// Every other field type must be a valid parameter type: `Arc<T>`,
/// `Option<P>`, or an owned value type such as `String`.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl ::yedi::Service for UserService {
///     type Dependencies = (Arc<Database>, Arc<Logger>, Option<Arc<Cache>>);
///     const PARAMETERS: &'static [&'static str] = &["db", "logger", "cache"];
///
///     fn create((db, logger, cache): Self::Dependencies) -> Self {
///         Self { db, logger, cache, requests: Default::default() }
///     }
/// }
/// ```
#[proc_macro_derive(Service, attributes(service))]
pub fn derive_service(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => {
                return quote! {
                    impl #impl_generics ::yedi::Service for #name #ty_generics #where_clause {
                        type Dependencies = ();

                        fn create(_: Self::Dependencies) -> Self {
                            Self
                        }
                    }
                }
                .into();
            }
            Fields::Unnamed(_) => {
                return syn::Error::new_spanned(
                    &input,
                    "Service can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Service can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut types = Vec::new();
    let mut bindings = Vec::new();
    let mut names = Vec::new();
    let mut inits = Vec::new();

    for field in fields.iter() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let kind = match field_kind(&field.attrs) {
            Ok(kind) => kind,
            Err(err) => return err.to_compile_error().into(),
        };

        match kind {
            FieldKind::Parameter => {
                let ty = &field.ty;
                types.push(quote! { #ty });
                bindings.push(ident.clone());
                names.push(ident.unraw().to_string());
                inits.push(quote! { #ident });
            }
            FieldKind::Default => {
                inits.push(quote! { #ident: ::std::default::Default::default() });
            }
        }
    }

    let expanded = quote! {
        impl #impl_generics ::yedi::Service for #name #ty_generics #where_clause {
            type Dependencies = (#(#types,)*);

            const PARAMETERS: &'static [&'static str] = &[#(#names),*];

            fn create((#(#bindings,)*): Self::Dependencies) -> Self {
                Self {
                    #(#inits),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}
