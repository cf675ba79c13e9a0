use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Fields, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token, Type};

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
    omit_empty: bool,
}

/// What the struct already declares through `#[serde(...)]`.
#[derive(Default)]
struct SerdeAttrs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

/// Expands `#[api_model]`: common derives, `ToSchema` behind the `server`
/// feature, `snake_case` keys and strict field checking.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    expand_model(args, input).unwrap_or_else(syn::Error::into_compile_error)
}

fn expand_model(args: TokenStream, mut input: ItemStruct) -> syn::Result<TokenStream> {
    let args = ModelArgs::parse(args)?;
    let derives = derived_trait_names(&input.attrs);
    let serde = SerdeAttrs::collect(&input.attrs)?;

    let mut missing = Vec::new();
    for (name, path) in [
        ("Debug", quote!(Debug)),
        ("Serialize", quote!(::serde::Serialize)),
        ("Deserialize", quote!(::serde::Deserialize)),
    ] {
        if !derives.contains(name) {
            missing.push(path);
        }
    }
    let derive_attr = if missing.is_empty() { quote!() } else { quote! { #[derive(#(#missing),*)] } };

    let schema_attr = if derives.contains("ToSchema") {
        quote!()
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    let rename = args.rename_all.unwrap_or_else(|| LitStr::new("snake_case", Span::call_site()));
    let rename_attr = match &serde.rename_all {
        Some(existing) if existing.value() != rename.value() => {
            return Err(syn::Error::new_spanned(
                existing,
                "Conflicting serde rename_all; remove it or set api_model(rename_all = \"...\") to match",
            ));
        },
        Some(_) => quote!(),
        None => quote! { #[serde(rename_all = #rename)] },
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (serde.deny_unknown_fields, deny) {
        (true, false) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            ));
        },
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote!(),
    };

    if args.omit_empty {
        omit_empty_fields(&mut input.fields);
    }

    Ok(quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #deny_attr
        #input
    })
}

/// Expands `#[api_handler]`: the `utoipa::path` attribute, applied only with
/// the `server` feature so handler crates still build without `utoipa`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

impl ModelArgs {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
        let mut parsed = Self::default();
        let mut seen = FxHashSet::default();

        for meta in metas {
            let nv = match meta {
                Meta::NameValue(nv) => nv,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Expected name-value arguments like `rename_all = \"...\"`",
                    ));
                },
            };
            let key = nv.path.get_ident().map(ToString::to_string).unwrap_or_default();
            if !seen.insert(key.clone()) {
                return Err(syn::Error::new_spanned(&nv, "Duplicate argument"));
            }

            match key.as_str() {
                "rename_all" => parsed.rename_all = Some(string_value(&nv)?),
                "deny_unknown_fields" => parsed.deny_unknown_fields = Some(bool_value(&nv)?),
                "omit_empty" => parsed.omit_empty = bool_value(&nv)?,
                _ => {
                    return Err(syn::Error::new_spanned(
                        nv.path,
                        "Unsupported argument; expected rename_all, deny_unknown_fields or omit_empty",
                    ));
                },
            }
        }
        Ok(parsed)
    }
}

impl SerdeAttrs {
    fn collect(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut found = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    found.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("deny_unknown_fields") {
                    found.deny_unknown_fields = true;
                } else if meta.input.peek(Token![=]) {
                    // Skip other `key = value` options.
                    let _: Expr = meta.value()?.parse()?;
                }
                Ok(())
            })?;
        }
        Ok(found)
    }
}

fn lit(nv: &MetaNameValue) -> Option<&Lit> {
    match &nv.value {
        Expr::Lit(ExprLit { lit, .. }) => Some(lit),
        _ => None,
    }
}

fn string_value(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match lit(nv) {
        Some(Lit::Str(s)) => Ok(s.clone()),
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
    }
}

fn bool_value(nv: &MetaNameValue) -> syn::Result<bool> {
    match lit(nv) {
        Some(Lit::Bool(b)) => Ok(b.value),
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
    }
}

/// `Option` fields are skipped when `None`, `Vec` fields when empty.
/// Fields with their own `skip_serializing_if` are left alone.
fn omit_empty_fields(fields: &mut Fields) {
    for field in fields.iter_mut() {
        let Some(check) = emptiness_check(&field.ty) else { continue };
        let already = field.attrs.iter().filter(|a| a.path().is_ident("serde")).any(|a| {
            let mut found = false;
            let _ = a.parse_nested_meta(|meta| {
                found |= meta.path.is_ident("skip_serializing_if");
                if meta.input.peek(Token![=]) {
                    let _: Expr = meta.value()?.parse()?;
                }
                Ok(())
            });
            found
        });
        if !already {
            field.attrs.push(syn::parse_quote! { #[serde(default, skip_serializing_if = #check)] });
        }
    }
}

fn emptiness_check(ty: &Type) -> Option<LitStr> {
    let Type::Path(path) = ty else { return None };
    let check = match path.path.segments.last()?.ident.to_string().as_str() {
        "Option" => "Option::is_none",
        "Vec" => "Vec::is_empty",
        _ => return None,
    };
    Some(LitStr::new(check, Span::call_site()))
}

fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                traits.insert(last.ident.to_string());
            }
            Ok(())
        });
    }
    traits
}
