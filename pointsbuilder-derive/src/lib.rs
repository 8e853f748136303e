//! Derive macros for PointsBuilder node parameters.
//!
//! This crate provides two derive macros:
//!
//! - [`NodeParams`] - Generates the declared field list and by-name access
//!   for a node kind's parameter struct
//! - [`ParamEnum`] - Maps a unit-only enum to and from its parameter string
//!
//! # Usage
//!
//! These macros are re-exported from the main `pointsbuilder` crate:
//!
//! ```ignore
//! use pointsbuilder::prelude::*;
//!
//! #[derive(NodeParams, Clone, Debug)]
//! struct AddLine {
//!     start: DVec3,
//!     end: DVec3,
//!     count: i32,
//! }
//!
//! #[derive(ParamEnum, Clone, Copy, PartialEq, Debug)]
//! enum FlowPattern {
//!     Waves,
//!     Swirl,
//! }
//! ```
//!
//! # Parameter Keys
//!
//! Field names are exposed under their camelCase spelling, so `seed_enabled`
//! is read and written as `"seedEnabled"`. This is the spelling used by
//! project files.
//!
//! # Supported Field Types
//!
//! | Rust type | Parameter kind |
//! |-----------|----------------|
//! | `f64` | `Number` |
//! | `i32`, `i64`, `u32`, `usize` | `Integer` |
//! | `bool` | `Bool` |
//! | `String` | `Text` |
//! | `DVec3` | `Vec3` |
//! | anything else | `Choice`, the type must implement `ParamEnum` |

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, Type};

/// Derive macro for enum-string parameters.
///
/// Variants are exposed as their snake_case names, in declaration order.
///
/// # Generated Items
///
/// For an enum `FlowPattern`:
///
/// - `FlowPattern::VARIANTS` - every accepted string
/// - `as_str()` - the string for a variant
/// - `parse(&str)` - the variant for a string, `None` if unrecognized
///
/// # Example
///
/// ```ignore
/// #[derive(ParamEnum, Clone, Copy, PartialEq)]
/// enum FlowPattern {
///     Waves,  // "waves"
///     Swirl,  // "swirl"
/// }
///
/// assert_eq!(FlowPattern::parse("swirl"), Some(FlowPattern::Swirl));
/// ```
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to a struct instead of an enum
/// - Any variant has fields
/// - Enum has zero variants
#[proc_macro_derive(ParamEnum)]
pub fn derive_param_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => panic!("ParamEnum derive only supports enums"),
    };

    if variants.is_empty() {
        panic!("ParamEnum enum must have at least one variant");
    }

    for variant in variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            panic!(
                "ParamEnum variants must be unit variants (no fields). \
                 Found fields on variant '{}'",
                variant.ident
            );
        }
    }

    let names: Vec<String> = variants
        .iter()
        .map(|variant| snake_case(&variant.ident.to_string()))
        .collect();

    let as_str_arms: Vec<_> = variants
        .iter()
        .zip(&names)
        .map(|(variant, text)| {
            let variant_name = &variant.ident;
            quote! { #name::#variant_name => #text }
        })
        .collect();

    let parse_arms: Vec<_> = variants
        .iter()
        .zip(&names)
        .map(|(variant, text)| {
            let variant_name = &variant.ident;
            quote! { #text => Some(#name::#variant_name) }
        })
        .collect();

    let expanded = quote! {
        impl pointsbuilder::params::ParamEnum for #name {
            const VARIANTS: &'static [&'static str] = &[#(#names),*];

            fn as_str(&self) -> &'static str {
                match self {
                    #(#as_str_arms),*
                }
            }

            fn parse(text: &str) -> Option<Self> {
                match text {
                    #(#parse_arms,)*
                    _ => None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for node parameter structs.
///
/// Generates an implementation of `NodeParams`:
///
/// - `FIELDS` - every declared parameter with its camelCase key and kind
/// - `get(key)` - the current value as a `ParamValue`
/// - `set(key, value)` - overwrite a field, rejecting unknown keys and
///   values of the wrong type
///
/// Defaults come from the struct's own `Default` implementation, which is
/// where each node kind declares its default parameters.
///
/// # Example
///
/// ```ignore
/// #[derive(NodeParams, Clone, Debug)]
/// pub struct AddCircle {
///     pub radius: f64,  // "radius": Number
///     pub count: i32,   // "count": Integer
/// }
/// ```
///
/// # Panics
///
/// Panics at compile time if applied to anything other than a struct with
/// named fields.
#[proc_macro_derive(NodeParams)]
pub fn derive_node_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            _ => panic!("NodeParams derive only supports structs with named fields"),
        },
        _ => panic!("NodeParams derive only supports structs"),
    };

    let mut field_entries = Vec::new();
    let mut get_arms = Vec::new();
    let mut set_arms = Vec::new();

    for field in fields {
        let field_name = match field.ident.as_ref() {
            Some(ident) => ident,
            None => continue,
        };
        let key = camel_case(&field_name.to_string());
        let kind = param_kind(&field.ty);
        let kind_tokens = kind_tokens(&kind, &field.ty);

        field_entries.push(quote! {
            pointsbuilder::params::ParamField { key: #key, kind: #kind_tokens }
        });

        let get_expr = generate_get(field_name, &kind);
        get_arms.push(quote! { #key => Some(#get_expr) });

        let set_block = generate_set(field_name, &field.ty, &kind, &kind_tokens);
        set_arms.push(quote! { #key => { #set_block } });
    }

    let expanded = quote! {
        impl pointsbuilder::params::NodeParams for #name {
            const FIELDS: &'static [pointsbuilder::params::ParamField] = &[
                #(#field_entries),*
            ];

            #[allow(unused_variables)]
            fn get(&self, key: &str) -> Option<pointsbuilder::params::ParamValue> {
                match key {
                    #(#get_arms,)*
                    _ => None,
                }
            }

            #[allow(unused_variables, unreachable_code)]
            fn set(
                &mut self,
                key: &str,
                value: &pointsbuilder::params::ParamValue,
            ) -> Result<(), pointsbuilder::ParamError> {
                match key {
                    #(#set_arms)*
                    _ => Err(pointsbuilder::ParamError::UnknownKey(key.to_string())),
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Parameter kind recognized from a field's Rust type.
enum Kind {
    Number,
    Integer,
    Bool,
    Text,
    Vec3,
    Choice,
}

/// Map a Rust field type onto its parameter kind.
fn param_kind(ty: &Type) -> Kind {
    let type_str = quote!(#ty).to_string().replace(' ', "");

    match type_str.as_str() {
        "f64" => Kind::Number,
        "i32" | "i64" | "u32" | "usize" => Kind::Integer,
        "bool" => Kind::Bool,
        "String" | "std::string::String" => Kind::Text,
        "DVec3" | "glam::DVec3" => Kind::Vec3,
        _ => Kind::Choice,
    }
}

fn kind_tokens(kind: &Kind, ty: &Type) -> proc_macro2::TokenStream {
    match kind {
        Kind::Number => quote! { pointsbuilder::params::ParamKind::Number },
        Kind::Integer => quote! { pointsbuilder::params::ParamKind::Integer },
        Kind::Bool => quote! { pointsbuilder::params::ParamKind::Bool },
        Kind::Text => quote! { pointsbuilder::params::ParamKind::Text },
        Kind::Vec3 => quote! { pointsbuilder::params::ParamKind::Vec3 },
        Kind::Choice => quote! {
            pointsbuilder::params::ParamKind::Choice(
                <#ty as pointsbuilder::params::ParamEnum>::VARIANTS
            )
        },
    }
}

/// Generate the expression reading a field into a `ParamValue`.
fn generate_get(field_name: &Ident, kind: &Kind) -> proc_macro2::TokenStream {
    match kind {
        Kind::Number => quote! { pointsbuilder::params::ParamValue::Number(self.#field_name) },
        Kind::Integer => {
            quote! { pointsbuilder::params::ParamValue::Integer(self.#field_name as i64) }
        }
        Kind::Bool => quote! { pointsbuilder::params::ParamValue::Bool(self.#field_name) },
        Kind::Text => {
            quote! { pointsbuilder::params::ParamValue::Text(self.#field_name.clone()) }
        }
        Kind::Vec3 => {
            quote! { pointsbuilder::params::ParamValue::Vec3(self.#field_name.to_array()) }
        }
        Kind::Choice => quote! {
            pointsbuilder::params::ParamValue::Text(
                pointsbuilder::params::ParamEnum::as_str(&self.#field_name).to_string()
            )
        },
    }
}

/// Generate the statements writing a `ParamValue` into a field.
fn generate_set(
    field_name: &Ident,
    ty: &Type,
    kind: &Kind,
    kind_tokens: &proc_macro2::TokenStream,
) -> proc_macro2::TokenStream {
    let converted = match kind {
        Kind::Number => quote! { value.as_f64() },
        Kind::Integer => quote! {
            value.as_i64().and_then(|v| <#ty as std::convert::TryFrom<i64>>::try_from(v).ok())
        },
        Kind::Bool => quote! { value.as_bool() },
        Kind::Text => quote! { value.as_str().map(|s| s.to_string()) },
        Kind::Vec3 => quote! { value.as_vec3() },
        Kind::Choice => quote! {
            value
                .as_str()
                .and_then(<#ty as pointsbuilder::params::ParamEnum>::parse)
        },
    };

    quote! {
        match #converted {
            Some(v) => {
                self.#field_name = v;
                Ok(())
            }
            None => Err(pointsbuilder::ParamError::TypeMismatch {
                key: key.to_string(),
                expected: #kind_tokens,
            }),
        }
    }
}

/// `seed_enabled` -> `seedEnabled`
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.trim_start_matches("r#").chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `SphereSurface` -> `sphere_surface`
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
