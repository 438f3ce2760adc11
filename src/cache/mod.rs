mod cache;
mod configuration;
mod entry;
mod hooks;
mod key;
mod stats;
mod tiered;
mod weight;

/// Cache implementations.
pub mod implementation;

#[allow(unused_imports)]
pub use {cache::*, configuration::*, entry::*, hooks::*, key::*, stats::*, tiered::*, weight::*};
