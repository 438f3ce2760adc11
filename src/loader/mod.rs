mod builder;
mod configuration;
mod handle;
mod hooks;
mod in_flight;
mod loader;
mod stats;

#[allow(unused_imports)]
pub use {builder::*, configuration::*, handle::*, hooks::*, loader::*, stats::*};
