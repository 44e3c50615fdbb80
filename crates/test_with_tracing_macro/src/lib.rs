// Copyright (C) Microsoft Corporation. All rights reserved.

//! Attribute macro behind `test_with_tracing::test`.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Nothing;
use syn::parse_macro_input;
use syn::ItemFn;

/// Marks a function as a test and initializes tracing before its body runs.
///
/// Other attributes (`#[should_panic]`, `#[ignore]`, ...) and `Result`
/// return types are passed through unchanged.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    parse_macro_input!(attr as Nothing);
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(item as ItemFn);

    quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis #sig {
            ::test_with_tracing::init();
            #block
        }
    }
    .into()
}
