//! `#[entity]` attribute: declares an entity's path, name and key shape at
//! compile time and generates its runtime model and field accessors.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Expr, ExprArray, ExprLit, ExprPath, Fields, Ident, ItemStruct, Lit, LitStr, Meta, Path, Token,
    Type, ext::IdentExt, parse::Parser, punctuated::Punctuated, spanned::Spanned,
};

/// Generate `Path`, `EntitySchema`, `FieldValues` and `FieldValuesMut` for
/// a struct with named fields.
///
/// ```ignore
/// #[entity(name = "UserRole", primary_key = [user_id, role_id])]
/// #[derive(Clone, Debug, Default, PartialEq)]
/// pub struct UserRole {
///     pub user_id: Ulid,
///     pub role_id: i32,
///     pub role_name: String,
/// }
/// ```
///
/// `primary_key` may be omitted; the key must then be registered with the
/// metadata cache or come from the store's model.
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Phase 1: parse inputs.
    let input = syn::parse_macro_input!(item as ItemStruct);
    let args = match EntityArgs::parse(attr) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    // Phase 2: collect struct fields and check the declared key against them.
    let fields = match collect_fields(&input) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };
    if let Err(err) = check_primary_key(&args.primary_key, &fields) {
        return err.to_compile_error().into();
    }

    // Phase 3: emit constants and impls.
    expand(&input, &args, &fields).into()
}

// One named struct field.
struct FieldInfo<'a> {
    ident: &'a Ident,
    name: LitStr,
    ty: &'a Type,
}

// Parsed and validated macro arguments for #[entity].
struct EntityArgs {
    crate_path: Path,
    entity_name: Option<LitStr>,
    path: Option<LitStr>,
    primary_key: Vec<Ident>,
}

impl EntityArgs {
    // Parse attribute arguments into a strongly-typed struct.
    fn parse(attr: TokenStream) -> Result<Self, syn::Error> {
        let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
        let args = parser.parse(attr)?;

        let mut crate_path = None;
        let mut entity_name = None;
        let mut path = None;
        let mut primary_key = Vec::new();

        for meta in args {
            let Meta::NameValue(name_value) = meta else {
                return Err(syn::Error::new(
                    meta.span(),
                    "entity expects key = value arguments",
                ));
            };
            let ident = name_value
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new(name_value.path.span(), "invalid argument name"))?
                .to_string();

            match ident.as_str() {
                "crate" => crate_path = Some(parse_path(&name_value.value, "crate")?),
                "name" => entity_name = Some(parse_lit_str(&name_value.value, "name")?),
                "path" => path = Some(parse_lit_str(&name_value.value, "path")?),
                "primary_key" => primary_key = parse_key_fields(&name_value.value)?,
                _ => {
                    return Err(syn::Error::new(
                        name_value.path.span(),
                        format!("unknown entity argument: {ident}"),
                    ));
                }
            }
        }

        let crate_path = match crate_path {
            Some(path) => path,
            None => syn::parse_str("::unirepo")?,
        };

        Ok(Self {
            crate_path,
            entity_name,
            path,
            primary_key,
        })
    }
}

fn collect_fields(input: &ItemStruct) -> Result<Vec<FieldInfo<'_>>, syn::Error> {
    let Fields::Named(fields) = &input.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "entity requires a struct with named fields",
        ));
    };

    Ok(fields
        .named
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            Some(FieldInfo {
                ident,
                name: LitStr::new(&ident.unraw().to_string(), ident.span()),
                ty: &field.ty,
            })
        })
        .collect())
}

// Every declared key field must be a struct field, and appear once.
fn check_primary_key(keys: &[Ident], fields: &[FieldInfo<'_>]) -> Result<(), syn::Error> {
    for (i, key) in keys.iter().enumerate() {
        if !fields.iter().any(|f| f.ident == key) {
            return Err(syn::Error::new(
                key.span(),
                format!("primary key field '{key}' is not a field of this struct"),
            ));
        }
        if keys[..i].contains(key) {
            return Err(syn::Error::new(
                key.span(),
                format!("primary key field '{key}' is listed twice"),
            ));
        }
    }

    Ok(())
}

fn expand(input: &ItemStruct, args: &EntityArgs, fields: &[FieldInfo<'_>]) -> TokenStream2 {
    let struct_ident = &input.ident;
    let cp = &args.crate_path;

    let struct_name_upper = struct_ident.to_string().to_ascii_uppercase();
    let fields_ident = Ident::new(
        &format!("__UNIREPO_FIELDS_{struct_name_upper}"),
        Span::call_site(),
    );
    let model_ident = Ident::new(
        &format!("__UNIREPO_MODEL_{struct_name_upper}"),
        Span::call_site(),
    );

    let entity_name = args
        .entity_name
        .clone()
        .unwrap_or_else(|| LitStr::new(&struct_ident.to_string(), struct_ident.span()));
    let entity_path = args.path.as_ref().map_or_else(
        || {
            let suffix = format!("::{struct_ident}");
            quote!(concat!(module_path!(), #suffix))
        },
        |lit| quote!(#lit),
    );

    let field_len = fields.len();
    let key_names = args
        .primary_key
        .iter()
        .map(|ident| LitStr::new(&ident.unraw().to_string(), ident.span()));

    let field_models = fields.iter().map(|f| {
        let FieldInfo { name, ty, .. } = f;
        quote! {
            #cp::model::field::EntityFieldModel {
                name: #name,
                kind: <#ty as #cp::traits::FieldValue>::KIND,
            }
        }
    });

    let get_arms = fields.iter().map(|f| {
        let FieldInfo { ident, name, .. } = f;
        quote! {
            #name => Some(#cp::traits::FieldValue::to_value(&self.#ident)),
        }
    });

    let set_arms = fields.iter().map(|f| {
        let FieldInfo { ident, name, ty } = f;
        quote! {
            #name => {
                self.#ident = <#ty as #cp::traits::FieldValue>::from_value(value).ok_or_else(|| {
                    #cp::traits::FieldSetError::type_mismatch(
                        #entity_name,
                        #name,
                        <#ty as #cp::traits::FieldValue>::KIND,
                        value,
                    )
                })?;
                Ok(())
            }
        }
    });

    quote! {
        #input

        const #fields_ident: [#cp::model::field::EntityFieldModel; #field_len] = [
            #(#field_models),*
        ];

        const #model_ident: #cp::model::entity::EntityModel = #cp::model::entity::EntityModel {
            path: #entity_path,
            entity_name: #entity_name,
            primary_key: &[#(#key_names),*],
            fields: &#fields_ident,
        };

        impl #cp::traits::Path for #struct_ident {
            const PATH: &'static str = #entity_path;
        }

        impl #cp::traits::EntitySchema for #struct_ident {
            const MODEL: &'static #cp::model::entity::EntityModel = &#model_ident;
        }

        impl #cp::traits::FieldValues for #struct_ident {
            fn get_value(&self, field: &str) -> Option<#cp::value::Value> {
                match field {
                    #(#get_arms)*
                    _ => None,
                }
            }
        }

        impl #cp::traits::FieldValuesMut for #struct_ident {
            fn set_value(
                &mut self,
                field: &str,
                value: &#cp::value::Value,
            ) -> Result<(), #cp::traits::FieldSetError> {
                match field {
                    #(#set_arms)*
                    _ => Err(#cp::traits::FieldSetError::unknown_field(#entity_name, field)),
                }
            }
        }
    }
}

// Parse a required string literal argument.
fn parse_lit_str(expr: &Expr, name: &str) -> Result<LitStr, syn::Error> {
    let Expr::Lit(ExprLit {
        lit: Lit::Str(lit), ..
    }) = expr
    else {
        return Err(syn::Error::new(
            expr.span(),
            format!("entity expects {name} to be a string literal"),
        ));
    };

    Ok(lit.clone())
}

// Parse a required path argument.
fn parse_path(expr: &Expr, name: &str) -> Result<Path, syn::Error> {
    let Expr::Path(ExprPath { path, .. }) = expr else {
        return Err(syn::Error::new(
            expr.span(),
            format!("entity expects {name} to be a path"),
        ));
    };

    Ok(path.clone())
}

// Parse `primary_key = field` or `primary_key = [a, b]`.
fn parse_key_fields(expr: &Expr) -> Result<Vec<Ident>, syn::Error> {
    match expr {
        Expr::Array(ExprArray { elems, .. }) => elems.iter().map(parse_key_ident).collect(),
        other => parse_key_ident(other).map(|ident| vec![ident]),
    }
}

fn parse_key_ident(expr: &Expr) -> Result<Ident, syn::Error> {
    let Expr::Path(ExprPath { path, .. }) = expr else {
        return Err(syn::Error::new(
            expr.span(),
            "entity expects primary_key to name struct fields",
        ));
    };

    path.get_ident().cloned().ok_or_else(|| {
        syn::Error::new(
            path.span(),
            "entity expects primary_key to name struct fields",
        )
    })
}
