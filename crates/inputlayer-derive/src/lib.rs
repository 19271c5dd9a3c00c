//! Derive macro for InputLayer relation schemas.
//!
//! `#[derive(Relation)]` turns a struct with named fields into a typed
//! relation: the field declaration order is the positional arity order of
//! the Datalog atom, and each field type maps to a storage type at
//! compile time.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, Type, parse_macro_input};

/// Derives the `Relation` trait for a struct with named fields.
///
/// # Attributes
///
/// - `#[relation(name = "relation_name")]` - Overrides the relation name
///   (defaults to snake_case of the struct name)
///
/// # Field Attributes
///
/// - `#[column(dim = N)]` - Fixes the dimension of a `Vector` or
///   `VectorInt8` column, declaring it as `vector[N]` / `vector_int8[N]`
///
/// # Generated Items
///
/// For a struct `Employee`, this macro generates:
///
/// - `impl Relation for Employee` with the relation name, ordered column
///   list, and per-instance value extraction
/// - One associated function per field (`Employee::salary()`) returning a
///   `Column` proxy for query building
///
/// # Supported field types
///
/// `i64`/`i32`/`u32` (int), `f64`/`f32` (float), `String` (string),
/// `bool` (bool), `Timestamp`, `Vector`, `VectorInt8`. Anything else is
/// a compile error.
#[proc_macro_derive(Relation, attributes(relation, column))]
pub fn derive_relation(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_relation_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_relation_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let relation_name = get_relation_name(&input.attrs, &struct_name.to_string())?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Relation derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Relation derive only supports structs",
            ));
        }
    };

    let mut column_entries: Vec<TokenStream2> = Vec::new();
    let mut value_entries: Vec<TokenStream2> = Vec::new();
    let mut accessors: Vec<TokenStream2> = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().expect("named field");
        let column_name = field_name.to_string();
        let dim = parse_column_dim(&field.attrs)?;
        let storage = storage_type_tokens(&field.ty, dim)?;

        column_entries.push(quote! {
            (#column_name, #storage)
        });

        value_entries.push(quote! {
            ::inputlayer_core::types::Value::from(self.#field_name.clone())
        });

        accessors.push(quote! {
            /// Returns a column proxy for query building.
            #[must_use]
            pub fn #field_name() -> ::inputlayer_core::column::Column {
                ::inputlayer_core::column::Column::new(
                    <Self as ::inputlayer_core::relation::Relation>::schema(),
                    #column_name,
                    ::core::option::Option::None,
                )
            }
        });
    }

    let expanded = quote! {
        impl ::inputlayer_core::relation::Relation for #struct_name {
            fn relation_name() -> &'static str {
                #relation_name
            }

            fn columns() -> ::std::vec::Vec<(&'static str, ::inputlayer_core::types::StorageType)> {
                ::std::vec![#(#column_entries),*]
            }

            fn values(&self) -> ::std::vec::Vec<::inputlayer_core::types::Value> {
                ::std::vec![#(#value_entries),*]
            }
        }

        impl #struct_name {
            #(#accessors)*
        }
    };

    Ok(expanded)
}

fn get_relation_name(attrs: &[Attribute], struct_name: &str) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("relation") {
            let mut name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: Expr = meta.value()?.parse()?;
                    if let Expr::Lit(lit) = value {
                        if let Lit::Str(s) = lit.lit {
                            name = Some(s.value());
                        }
                    }
                    Ok(())
                } else {
                    Err(meta.error("unsupported relation attribute"))
                }
            })?;
            if let Some(name) = name {
                return Ok(name);
            }
        }
    }
    Ok(to_snake_case(struct_name))
}

fn parse_column_dim(attrs: &[Attribute]) -> syn::Result<Option<u32>> {
    for attr in attrs {
        if attr.path().is_ident("column") {
            let mut dim = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("dim") {
                    let value: Expr = meta.value()?.parse()?;
                    if let Expr::Lit(lit) = value {
                        if let Lit::Int(n) = lit.lit {
                            dim = Some(n.base10_parse::<u32>()?);
                        }
                    }
                    Ok(())
                } else {
                    Err(meta.error("unsupported column attribute"))
                }
            })?;
            if dim.is_some() {
                return Ok(dim);
            }
        }
    }
    Ok(None)
}

/// Maps a field type to its storage-type constructor tokens.
fn storage_type_tokens(ty: &Type, dim: Option<u32>) -> syn::Result<TokenStream2> {
    let ident = match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    let dim_tokens = match dim {
        Some(n) => quote! { ::core::option::Option::Some(#n) },
        None => quote! { ::core::option::Option::None },
    };

    let tokens = match ident.as_str() {
        "i64" | "i32" | "u32" => quote! { ::inputlayer_core::types::StorageType::Int },
        "f64" | "f32" => quote! { ::inputlayer_core::types::StorageType::Float },
        "String" => quote! { ::inputlayer_core::types::StorageType::String },
        "bool" => quote! { ::inputlayer_core::types::StorageType::Bool },
        "Timestamp" => quote! { ::inputlayer_core::types::StorageType::Timestamp },
        "Vector" => quote! { ::inputlayer_core::types::StorageType::Vector(#dim_tokens) },
        "VectorInt8" => {
            quote! { ::inputlayer_core::types::StorageType::VectorInt8(#dim_tokens) }
        }
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                "unsupported field type for an InputLayer relation; expected \
                 i64, i32, u32, f64, f32, String, bool, Timestamp, Vector, or VectorInt8",
            ));
        }
    };

    if dim.is_some() && !matches!(ident.as_str(), "Vector" | "VectorInt8") {
        return Err(syn::Error::new_spanned(
            ty,
            "#[column(dim = N)] only applies to Vector and VectorInt8 fields",
        ));
    }

    Ok(tokens)
}

/// Converts a PascalCase type name to snake_case, keeping acronym runs
/// grouped (`HTTPRequest` -> `http_request`).
fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() {
                out.push('_');
            } else if prev.is_ascii_uppercase() && next_lower {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}
