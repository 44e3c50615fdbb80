// Copyright (C) Microsoft Corporation. All rights reserved.

//! Test harness glue: `#[test_with_tracing::test]` installs a tracing
//! subscriber wired to the libtest writer before the test body runs.
//!
//! Filtering follows `PORTABLE_CRYPTO_LOG`, then `RUST_LOG`, and otherwise
//! shows everything at `DEBUG` and above.

// Test-only crate; `expect` is acceptable here.
#![allow(clippy::expect_used)]

#[cfg(test)]
extern crate self as test_with_tracing;

pub use test_with_tracing_macro::test;
use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

const LOG_ENV_VARS: [&str; 2] = ["PORTABLE_CRYPTO_LOG", "RUST_LOG"];

fn targets() -> Targets {
    LOG_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .map(|filter| {
            filter
                .parse()
                .expect("log filter environment variable is not a valid target list")
        })
        .unwrap_or_else(|| Targets::new().with_default(LevelFilter::DEBUG))
}

#[doc(hidden)]
/// Installs the global test subscriber. Safe to call from every test.
pub fn init() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .pretty()
            .with_ansi(false)
            .log_internal_errors(true)
            .with_test_writer()
            .with_max_level(LevelFilter::TRACE)
            .with_thread_ids(true)
            .with_target(true)
            .finish()
            .with(targets())
            .init();
    });
}
