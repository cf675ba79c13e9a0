use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, ItemStruct, LitStr, Token};

/// Expands `#[ocrhub_slice]` / `#[ocrhub_slice(name = "...")]`.
pub fn expand_slice(args: TokenStream, input: ItemStruct) -> TokenStream {
    slice_name(args, &input.ident)
        .map(|name| expand(&name, input))
        .unwrap_or_else(syn::Error::into_compile_error)
}

/// Registry key: the explicit `name`, else the struct name in lowercase.
fn slice_name(args: TokenStream, ident: &Ident) -> syn::Result<LitStr> {
    if args.is_empty() {
        return Ok(LitStr::new(&ident.to_string().to_lowercase(), ident.span()));
    }

    let parser = |input: syn::parse::ParseStream<'_>| {
        let key: Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new_spanned(key, "expected `name = \"...\"`"));
        }
        input.parse::<Token![=]>()?;
        let name: LitStr = input.parse()?;
        if name.value().trim().is_empty() {
            return Err(syn::Error::new_spanned(name, "slice name cannot be empty"));
        }
        Ok(name)
    };
    syn::parse::Parser::parse2(parser, args)
}

fn expand(name: &LitStr, input: ItemStruct) -> TokenStream {
    let ItemStruct { attrs, vis, ident: wrapper, fields, .. } = input;
    let inner = format_ident!("{wrapper}Inner");
    let semi = matches!(fields, syn::Fields::Unnamed(_)).then(|| quote!(;));

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #inner #fields #semi

        /// Shared handle registered in the API state.
        #[derive(Debug, Clone)]
        #vis struct #wrapper {
            inner: std::sync::Arc<#inner>,
        }

        impl #wrapper {
            #[must_use]
            pub fn new(inner: #inner) -> Self {
                Self { inner: std::sync::Arc::new(inner) }
            }
        }

        impl std::ops::Deref for #wrapper {
            type Target = #inner;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::ocrhub_kernel::domain::registry::FeatureSlice for #wrapper {
            fn name(&self) -> &'static str {
                #name
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    }
}
