//! Procedural macros re-exported by `fanfold-macros`.
//!
//! Do not depend on this crate directly: expansions refer to `::fanfold_macros`.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    parse_macro_input, AttributeArgs, Ident, ItemFn, Lit, Meta, MetaNameValue, NestedMeta,
};

/// Levels accepted by [`macro@test_traced`].
const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Level used when none is provided.
const DEFAULT_LEVEL: &str = "DEBUG";

/// Run a test function with a [tracing](https://docs.rs/tracing) subscriber
/// installed that writes to the test output.
///
/// The optional `level` argument is the maximum level to capture (case-insensitive,
/// defaults to `DEBUG`).
///
/// # Example
/// ```rust,ignore
/// use fanfold_macros::test_traced;
///
/// #[test_traced(level = "INFO")]
/// fn test_with_logs() {
///     tracing::info!("captured");
/// }
/// ```
#[proc_macro_attribute]
pub fn test_traced(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    // Parse the level
    let args = parse_macro_input!(attr as AttributeArgs);
    let mut level = DEFAULT_LEVEL.to_string();
    for arg in args {
        match arg {
            NestedMeta::Meta(Meta::NameValue(MetaNameValue {
                path,
                lit: Lit::Str(literal),
                ..
            })) if path.is_ident("level") => {
                let value = literal.value().to_uppercase();
                if !LEVELS.contains(&value.as_str()) {
                    return syn::Error::new(
                        literal.span(),
                        format!("invalid log level, expected one of {LEVELS:?}"),
                    )
                    .to_compile_error()
                    .into();
                }
                level = value;
            }
            other => {
                return syn::Error::new_spanned(other, "expected `level = \"...\"`")
                    .to_compile_error()
                    .into();
            }
        }
    }
    let level = Ident::new(&level, Span::call_site());

    // Wrap the body with a scoped subscriber
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis #sig {
            let subscriber = ::fanfold_macros::tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(::fanfold_macros::tracing::Level::#level)
                .with_line_number(true)
                .with_thread_names(true)
                .finish();
            let dispatch = ::fanfold_macros::tracing::Dispatch::new(subscriber);
            ::fanfold_macros::tracing::dispatcher::with_default(&dispatch, || #block)
        }
    };
    TokenStream::from(expanded)
}
