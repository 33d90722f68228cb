#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::explicit_iter_loop,
    clippy::todo,
    clippy::unimplemented,
    clippy::use_self,
    clippy::doc_markdown,
    clippy::print_stdout,
    missing_debug_implementations,
    unreachable_pub,
    missing_docs
)]

mod error;
pub use error::Error;

pub mod wire;

mod transport;

pub mod store;

pub mod server;

pub mod client;

// The library itself never calls into these; they're pulled in for the
// bin targets (`env_logger`) and benches/tests (the rest).
use env_logger as _;
#[cfg(test)]
use criterion as _;
#[cfg(test)]
use hex_literal as _;
