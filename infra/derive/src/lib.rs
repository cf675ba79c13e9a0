#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the `OcrHub` infrastructure.
//! This crate provides attribute macros that remove the boilerplate around the
//! async runtime bootstrap, error enums, feature slices, and API models.
//!
//! ## Usage
//! Add the crate as a workspace dependency:
//! ```toml
//! [dependencies]
//! ocrhub-derive.workspace = true
//! ```
//!
//! Macro docstrings are `ignore`d to avoid compiling them in this crate.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the specialized Tokio runtime.
///
/// Transforms an `async fn main` into a standard `fn main` that builds a
/// runtime from one of the `ocrhub_runtime::RuntimeConfig` presets.
///
/// # Arguments
///
/// * `server` - The HTTP server profile (wide blocking pool for engine processes).
/// * `compact` - Small footprint for tools and sidecars.
/// * `default` - Worker threads auto-detected from available parallelism.
///
/// # Examples
///
/// ```rust,ignore
/// #[ocrhub_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
/// # Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro to define a response/request model of the HTTP API.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Serialize`, and `Deserialize` when missing.
/// * **`OpenAPI`**: `utoipa::ToSchema` when the consuming crate's `server` feature is on.
/// * **Serde Policy**: `rename_all = "snake_case"` and `deny_unknown_fields` by default.
///
/// # Arguments
///
/// * `rename_all = "camelCase"` - Overrides the default Serde rename policy.
/// * `deny_unknown_fields = false` - Disables strict field checking.
/// * `omit_empty = true` - Skips `None` options and empty vectors when serializing.
///
/// # Example
///
/// ```rust,ignore
/// use ocrhub_derive::api_model;
///
/// #[api_model]
/// pub struct StatusResponse {
///     pub service: &'static str,
///     pub languages: Vec<&'static str>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro to bridge Axum handlers with `OpenAPI` documentation.
///
/// Accepts standard `utoipa::path` arguments such as `get`, `post`,
/// `path = "..."`, `request_body(...)`, `responses(...)`, and `tag = "..."`.
/// The `utoipa::path` attribute is only applied with the `server` feature.
///
/// # Example
///
/// ```rust,ignore
/// use ocrhub_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/status",
///     responses((status = OK, body = StatusResponse)),
///     tag = "Recognition"
/// )]
/// pub async fn status_handler() -> Json<StatusResponse> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// A high-level attribute macro for defining crate error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a source field,
///   enabling the use of the `?` operator for upstream errors.
/// * **Internal Fallback**: `From<&str>` and `From<String>` when an `Internal` variant exists.
/// * **Kind**: `kind()` returns the variant name, handy as a log field.
/// * **Client Text**: `public_message()` returns the variant's `#[public("...")]`
///   text, falling back to `Display`. Use it for messages sent over HTTP.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must include a `source: T` field or a field marked
///    with `#[source]`/`#[from]` (compatible with `thiserror`).
/// 4. Tuple or unit variants are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use ocrhub_derive::ocrhub_error;
/// use std::borrow::Cow;
///
/// #[ocrhub_error]
/// pub enum EngineError {
///     #[public("Unsupported file type")]
///     #[error("Unsupported file{}: {name}", format_context(.context))]
///     Unsupported { name: String, context: Option<Cow<'static, str>> },
///
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io {
///         #[source]
///         source: std::io::Error,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read_image(path: &Path) -> Result<Vec<u8>, EngineError> {
///     std::fs::read(path).context("Reading page image")
/// }
/// ```
#[proc_macro_attribute]
pub fn ocrhub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a feature slice handle.
///
/// 1. Generates a thread-safe `Arc` wrapper around `<Name>Inner`.
/// 2. Implements `Deref` for transparent access to the inner state.
/// 3. Implements `FeatureSlice` for registration in the kernel state. The slice
///    is registered as the lowercase struct name unless `name = "..."` is given.
///
/// # Example
/// ```rust,ignore
/// #[ocrhub_derive::ocrhub_slice]
/// pub struct Recognition {
///     pub recognizer: Recognizer,
/// }
///
/// let slice = Recognition::new(RecognitionInner { recognizer });
/// ```
#[proc_macro_attribute]
pub fn ocrhub_slice(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(attr.into(), input).into()
}
