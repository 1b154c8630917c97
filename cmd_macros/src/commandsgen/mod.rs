//! # Command Table Macro
//!
//! Generates a module that registers a fixed set of commands into a
//! `cmd_core::Registry`. Every spec is checked while the macro expands, by
//! registering it into a throwaway registry, so a malformed spec, an unknown
//! `<TAG>`, a duplicate path or a grammar conflict is a compile error
//! pointing at the offending literal instead of a runtime `RegisterError`.
//!
//! ## Macro Input Format
//!
//! ```text
//! register_commands! {
//!     mod <module_name>;
//!     "<spec>" => <handler path>,
//!     ...
//! }
//! ```
//!
//! Handler paths are resolved from the module the macro is invoked in.
//!
//! ## Generated API
//! - `SPECS: &[&str]`: every spec, in declaration order
//! - `register(&mut Registry) -> Result<(), RegisterError>`
//! - `get_command_names() -> Vec<&'static str>`: root names, sorted

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Ident, LitStr, Path, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

use cmd_core::{ArgBundle, CommandSpec, Registry};

/// One `"spec" => path` mapping.
struct CommandEntry {
    spec: LitStr,
    _arrow: Token![=>],
    handler: Path,
}

impl Parse for CommandEntry {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(CommandEntry {
            spec: input.parse()?,
            _arrow: input.parse()?,
            handler: input.parse()?,
        })
    }
}

/// `mod <name>;` followed by comma separated entries.
struct CommandMacroInput {
    mod_name: Ident,
    entries: Punctuated<CommandEntry, Token![,]>,
}

impl Parse for CommandMacroInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        input.parse::<Token![mod]>()?;
        let mod_name: Ident = input.parse()?;
        input.parse::<Token![;]>()?;
        let entries = Punctuated::parse_terminated(input)?;
        Ok(CommandMacroInput { mod_name, entries })
    }
}

pub fn register_commands_impl(input: TokenStream2) -> TokenStream2 {
    match expand(input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error(),
    }
}

fn expand(input: TokenStream2) -> syn::Result<TokenStream2> {
    let CommandMacroInput { mod_name, entries } = syn::parse2(input)?;

    if entries.is_empty() {
        return Err(syn::Error::new(
            mod_name.span(),
            "register_commands! needs at least one command",
        ));
    }

    // Same checks the runtime registry performs, reported at the literal.
    let mut probe = Registry::new();
    for entry in &entries {
        let text = entry.spec.value();
        probe.register(&text, |_: &ArgBundle<'_>| {}).map_err(|e| {
            syn::Error::new(
                entry.spec.span(),
                format!("invalid command spec `{text}`: {e}"),
            )
        })?;
    }

    let specs: Vec<LitStr> = entries
        .iter()
        .map(|e| {
            // normalized form, as the registry sees it
            let spec = CommandSpec::parse(&e.spec.value())
                .map(|s| s.to_string())
                .unwrap_or_default();
            LitStr::new(&spec, e.spec.span())
        })
        .collect();
    let handlers: Vec<&Path> = entries.iter().map(|e| &e.handler).collect();
    let names: Vec<LitStr> = probe
        .command_names()
        .into_iter()
        .map(|n| LitStr::new(n, Span::call_site()))
        .collect();

    Ok(quote! {
        pub mod #mod_name {
            #[allow(unused_imports)]
            use super::*;

            /// Every registered spec, in declaration order.
            pub const SPECS: &[&str] = &[ #( #specs ),* ];

            /// Register every command; stops at the first failure.
            pub fn register(
                registry: &mut ::cmd_core::Registry,
            ) -> ::core::result::Result<(), ::cmd_core::RegisterError> {
                #( registry.register(#specs, #handlers)?; )*
                Ok(())
            }

            /// Root command names (sorted).
            pub fn get_command_names() -> Vec<&'static str> {
                vec![ #( #names ),* ]
            }
        }
    })
}

// ==================== TESTS =======================
