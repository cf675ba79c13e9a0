use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Expands the `#[ocrhub_runtime::main]` attribute macro.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    expand(args, input).unwrap_or_else(Error::into_compile_error)
}

fn expand(args: TokenStream, input: ItemFn) -> syn::Result<TokenStream> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(
            input.sig.fn_token,
            "#[ocrhub_runtime::main] can only be used on async functions",
        ));
    }
    if !returns_result(&input.sig.output) {
        return Err(Error::new_spanned(
            &input.sig.output,
            "#[ocrhub_runtime::main] requires a Result return type",
        ));
    }

    let preset = profile(args)?;
    let ItemFn { attrs, vis, mut sig, block } = input;
    sig.asyncness = None;

    Ok(quote! {
        #(#attrs)*
        #vis #sig {
            let config = ::ocrhub_runtime::RuntimeConfig::#preset();
            let rt = ::ocrhub_runtime::build_runtime_with_config(&config)?;
            rt.block_on(async move #block)
        }
    })
}

/// Maps `server` / `compact` / `default` (or nothing) to a `RuntimeConfig` constructor.
fn profile(args: TokenStream) -> syn::Result<Ident> {
    if args.is_empty() {
        return Ok(Ident::new("default", proc_macro2::Span::call_site()));
    }

    let ident: Ident = syn::parse2(args)?;
    match ident.to_string().as_str() {
        "server" | "compact" | "default" => Ok(ident),
        _ => Err(Error::new_spanned(ident, "Unknown runtime profile. Use: server, compact, or default")),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
