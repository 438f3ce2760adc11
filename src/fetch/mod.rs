mod configuration;
mod decoder;
mod fetcher;
mod service;
mod timeout;

#[allow(unused_imports)]
pub use {configuration::*, decoder::*, fetcher::*, service::*, timeout::*};
