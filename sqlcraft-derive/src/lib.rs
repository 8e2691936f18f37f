//! `#[derive(FromRow)]` - generates a [`sqlcraft::qrm::FromRow`] impl from a
//! struct's own field shape.
//!
//! The derive reads two struct/field-level attributes (§6.2 of the design):
//!
//! - `#[sql(table = "...")]` / `#[sql(alias = "...")]` - overrides the
//!   struct name used to match the `"<Table>."` column prefix.
//! - `#[sql(primary_key)]` - marks a field as contributing to this level's
//!   fingerprint; if any field is marked, only marked fields contribute.
//!
//! Fields are classified by their declared type, not by inspecting values:
//! `Vec<Child>` becomes a folded one-to-many collection, `Option<Box<Child>>`
//! an optional singleton, everything else a scalar column assigned through
//! `FromSqlValue`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments,
    Type,
};

#[proc_macro_derive(FromRow, attributes(sql))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// What a field's declared type tells us about how QRM should treat it.
enum FieldShape {
    /// An ordinary scalar column, assigned via `FromSqlValue`.
    Scalar,
    /// `Vec<Child>` - a folded one-to-many collection.
    Many(Type),
    /// `Option<Box<Child>>` - a folded optional singleton.
    One(Type),
}

struct FieldInfo {
    ident: Ident,
    column: String,
    shape: FieldShape,
    primary_key: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = table_name_override(&input)?.unwrap_or_else(|| struct_name.to_string());

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input,
            "FromRow can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input,
            "FromRow requires named fields",
        ));
    };

    let mut infos = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let ident = field.ident.clone().expect("named field");
        let column = to_pascal_case(&ident.to_string());
        let primary_key = has_primary_key_attr(field)?;
        let shape = classify(&field.ty);
        infos.push(FieldInfo {
            ident,
            column,
            shape,
            primary_key,
        });
    }

    let any_primary_key = infos.iter().any(|f| f.primary_key);

    let scalar_columns_entries = infos.iter().filter_map(|f| match f.shape {
        FieldShape::Scalar => {
            let col = &f.column;
            let pk = if any_primary_key { f.primary_key } else { true };
            Some(quote! { (#col, #pk) })
        }
        _ => None,
    });

    let build_fields = infos.iter().map(|f| {
        let ident = &f.ident;
        match &f.shape {
            FieldShape::Scalar => {
                let key = format!("{table_name}.{}", f.column);
                quote! {
                    #ident: ::sqlcraft::qrm::FromSqlValue::from_sql_value(
                        #key,
                        row.get(#key).unwrap_or(&::sqlcraft::value::Value::Null),
                    )?
                }
            }
            FieldShape::Many(_) => quote! { #ident: ::std::vec::Vec::new() },
            FieldShape::One(_) => quote! { #ident: ::std::option::Option::None },
        }
    });

    let fold_stmts = infos.iter().filter_map(|f| {
        let ident = &f.ident;
        let field_name = ident.to_string();
        match &f.shape {
            FieldShape::Scalar => None,
            FieldShape::Many(child) => Some(quote! {
                state
                    .many_cursor::<#child>(#field_name)
                    .ingest(&mut self.#ident, row)?;
            }),
            FieldShape::One(child) => Some(quote! {
                state
                    .one_cursor::<#child>(#field_name)
                    .ingest(&mut self.#ident, row)?;
            }),
        }
    });

    Ok(quote! {
        impl ::sqlcraft::qrm::FromRow for #struct_name {
            const TABLE: &'static str = #table_name;

            fn scalar_columns() -> &'static [(&'static str, bool)] {
                &[ #(#scalar_columns_entries),* ]
            }

            fn build(row: &::sqlcraft::qrm::Row) -> ::sqlcraft::error::Result<Self> {
                Ok(Self {
                    #(#build_fields),*
                })
            }

            fn fold_children(
                &mut self,
                row: &::sqlcraft::qrm::Row,
                state: &mut ::sqlcraft::qrm::FoldState,
            ) -> ::sqlcraft::error::Result<()> {
                #(#fold_stmts)*
                Ok(())
            }
        }
    })
}

/// `Vec<T>` -> [`FieldShape::Many`], `Option<Box<T>>` -> [`FieldShape::One`],
/// anything else -> [`FieldShape::Scalar`].
fn classify(ty: &Type) -> FieldShape {
    if let Some(inner) = inner_of("Vec", ty) {
        return FieldShape::Many(inner);
    }
    if let Some(opt_inner) = inner_of("Option", ty) {
        if let Some(boxed) = inner_of("Box", &opt_inner) {
            return FieldShape::One(boxed);
        }
    }
    FieldShape::Scalar
}

/// If `ty` is `name<Inner>` (matched on the path's last segment, so this
/// also accepts `std::vec::Vec<Inner>` etc.), returns `Inner`.
fn inner_of(name: &str, ty: &Type) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    })
}

/// Normalizes a `snake_case` Rust field name to the `PascalCase` convention
/// this codebase's generated column aliases use (`album_id` -> `AlbumId`),
/// matching a row's `"<Table>.<Column>"` projection alias case-insensitively
/// (§4.5). `Row::get` additionally falls back to a case-insensitive scan,
/// so an unconventionally-cased source column still resolves.
fn to_pascal_case(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn table_name_override(input: &DeriveInput) -> syn::Result<Option<String>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }
        let mut found = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") || meta.path.is_ident("alias") {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `table` or `alias`"))
            }
        })?;
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

fn has_primary_key_attr(field: &syn::Field) -> syn::Result<bool> {
    for attr in &field.attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }
        let mut found = false;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                found = true;
                Ok(())
            } else {
                Err(meta.error("expected `primary_key`"))
            }
        })?;
        if found {
            return Ok(true);
        }
    }
    Ok(false)
}
