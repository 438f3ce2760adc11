mod builder;
mod cache;
mod weigher;

#[allow(unused_imports)]
pub use {builder::*, cache::*, weigher::*};
