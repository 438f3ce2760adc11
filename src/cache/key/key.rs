use super::super::weight::*;

use std::{fmt, hash::*};

//
// CacheKey
//

/// Cache key.
///
/// Uniquely identifies one logical asset. Keys are compared and hashed both by the cache and by
/// the loader's in-flight table, so two equal keys always refer to the same asset.
pub trait CacheKey
where
    Self: 'static + Clone + fmt::Debug + fmt::Display + Eq + Hash + Send + CacheWeight + Sync,
{
}

impl CacheKey for String {}
