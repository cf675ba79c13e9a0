use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type};

const CONTEXT_TYPE: &str = "Option<Cow<'static,str>>";

/// One enum variant, as far as the generated impls care.
struct ErrorVariant {
    ident: Ident,
    source: Option<(Ident, Type)>,
    has_context: bool,
    public: Option<LitStr>,
    cfg_attrs: Vec<Attribute>,
}

impl ErrorVariant {
    fn parse(variant: &mut syn::Variant) -> syn::Result<Self> {
        let public = take_public_attr(&mut variant.attrs)?;
        let cfg_attrs = variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect();

        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "ocrhub_error requires named fields for source/context handling",
            ));
        };

        let mut has_context = false;
        let mut source = None;
        for field in &fields.named {
            let Some(ident) = &field.ident else { continue };
            if ident == "context" {
                if normalized(&field.ty) != CONTEXT_TYPE {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "context field must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if source.is_none() && is_source_field(field) {
                source = Some((ident.clone(), field.ty.clone()));
            }
        }

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "ocrhub_error requires `context: Option<Cow<'static, str>>` for variants with a source",
            ));
        }

        Ok(Self { ident: variant.ident.clone(), source, has_context, public, cfg_attrs })
    }

    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

pub fn expand_derive(mut input: DeriveInput) -> TokenStream {
    let Data::Enum(data) = &mut input.data else {
        return quote! { compile_error!("ocrhub_error can only be derived for enums"); };
    };

    let variants = match data.variants.iter_mut().map(ErrorVariant::parse).collect::<syn::Result<Vec<_>>>() {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let trait_name = format_ident!("{}Ext", name);

    let derived = derived_trait_names(&input.attrs);
    let missing: Vec<TokenStream> = [("Debug", quote!(Debug)), ("Error", quote!(::thiserror::Error))]
        .into_iter()
        .filter(|(ident, _)| !derived.contains(*ident))
        .map(|(_, path)| path)
        .collect();
    let extra_derives = if missing.is_empty() { quote!() } else { quote! { #[derive(#(#missing),*)] } };

    let context_trait = context_trait(name, &trait_name, &variants);
    let from_impls = variants
        .iter()
        .filter(|v| !v.is_internal())
        .filter_map(|v| from_source_impl(name, &trait_name, v));
    let internal_impls = variants.iter().find(|v| v.is_internal()).map(|v| internal_impls(name, v));
    let inherent = inherent_impl(name, &variants);

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #extra_derives
        #input

        #context_trait
        #(#from_impls)*
        #internal_impls
        #inherent

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            context.as_ref().map_or(std::borrow::Cow::Borrowed(""), |c| std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

/// Removes `#[public("...")]` from the variant and returns its message.
fn take_public_attr(attrs: &mut Vec<Attribute>) -> syn::Result<Option<LitStr>> {
    let mut public = None;
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("public") {
            return true;
        }
        match attr.parse_args::<LitStr>() {
            Ok(message) => public = Some(message),
            Err(err) => result = Err(err),
        }
        false
    });
    result.map(|()| public)
}

fn is_source_field(field: &syn::Field) -> bool {
    field.ident.as_ref().is_some_and(|ident| ident == "source")
        || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
}

/// Type tokens without whitespace and leading path segments, e.g. `Option<Cow<'static,str>>`.
fn normalized(ty: &Type) -> String {
    let text: String = ty.to_token_stream().to_string().chars().filter(|c| !c.is_whitespace()).collect();
    text.replace("std::borrow::", "").replace("::std::option::", "").replace("std::option::", "")
}

fn context_trait(name: &Ident, trait_name: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let (cfg, ident) = (&v.cfg_attrs, &v.ident);
        quote! { #(#cfg)* #name::#ident { context: c, .. } => *c = Some(context.into()), }
    });

    quote! {
        pub trait #trait_name<T> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #trait_name<T> for Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut e| {
                    match &mut e {
                        #( #arms )*
                        _ => {}
                    }
                    e
                })
            }
        }
    }
}

fn from_source_impl(name: &Ident, trait_name: &Ident, v: &ErrorVariant) -> Option<TokenStream> {
    let (field, ty) = v.source.as_ref()?;
    let (cfg, ident) = (&v.cfg_attrs, &v.ident);

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self { Self::#ident { #field, context: None } }
        }

        #(#cfg)*
        impl<T> #trait_name<T> for std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn internal_impls(name: &Ident, internal: &ErrorVariant) -> TokenStream {
    let cfg = &internal.cfg_attrs;
    quote! {
        #(#cfg)*
        impl From<&'static str> for #name {
            #[inline]
            fn from(s: &'static str) -> Self { Self::Internal { message: std::borrow::Cow::Borrowed(s), context: None } }
        }
        #(#cfg)*
        impl From<String> for #name {
            #[inline]
            fn from(s: String) -> Self { Self::Internal { message: std::borrow::Cow::Owned(s), context: None } }
        }
    }
}

/// `kind()` (variant name, for log fields) and `public_message()` (client-facing text).
fn inherent_impl(name: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let kind_arms = variants.iter().map(|v| {
        let (cfg, ident) = (&v.cfg_attrs, &v.ident);
        let label = ident.to_string();
        quote! { #(#cfg)* Self::#ident { .. } => #label, }
    });

    let public_arms = variants.iter().filter_map(|v| {
        let message = v.public.as_ref()?;
        let (cfg, ident) = (&v.cfg_attrs, &v.ident);
        Some(quote! { #(#cfg)* Self::#ident { .. } => std::borrow::Cow::Borrowed(#message), })
    });

    quote! {
        #[automatically_derived]
        impl #name {
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #( #kind_arms )*
                }
            }

            /// Text safe to hand to API clients: the `#[public]` message when
            /// the variant has one, otherwise the `Display` output.
            #[must_use]
            #[allow(unreachable_patterns)]
            pub fn public_message(&self) -> std::borrow::Cow<'static, str> {
                match self {
                    #( #public_arms )*
                    other => std::borrow::Cow::Owned(other.to_string()),
                }
            }
        }
    }
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
