extern crate proc_macro;

mod commandsgen;

use proc_macro::TokenStream;
use commandsgen::register_commands_impl;

#[proc_macro]
pub fn register_commands(input: TokenStream) -> TokenStream {
    register_commands_impl(input.into()).into()
}
