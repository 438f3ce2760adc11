// https://stackoverflow.com/a/61417700
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod error;
mod fetch;
mod listing;
mod loader;

/// Cache.
pub mod cache;

pub use {error::*, fetch::*, listing::*, loader::*};
