mod key;
mod url;

#[allow(unused_imports)]
pub use {key::*, url::*};
