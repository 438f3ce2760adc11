use {
    bytes::*,
    std::{rc::*, sync::*},
};

//
// CacheWeight
//

/// Cache weight.
pub trait CacheWeight {
    /// Cache weight as a byte count.
    ///
    /// It is *not* the amount of memory used, but rather an indicator of *potential* storage
    /// requirements.
    ///
    /// Its intended use is for apples-to-apples comparisons, e.g. to find out which of two assets
    /// of the same type weighs more. Decoded assets are often much larger than the bytes they
    /// were decoded from, so a [Decoder](crate::Decoder) producing, say, pixel buffers should
    /// report the size of the buffer and not of the compressed source.
    ///
    /// Note that *sums* of weights can be misleading in terms of memory use because there might
    /// be memory shared between assets, e.g. via the use of [Bytes] or [Arc].
    fn cache_weight(&self) -> usize;
}

impl CacheWeight for Bytes {
    fn cache_weight(&self) -> usize {
        const SELF_SIZE: usize = size_of::<Bytes>();
        SELF_SIZE + self.len()
    }
}

impl CacheWeight for Vec<u8> {
    fn cache_weight(&self) -> usize {
        const SELF_SIZE: usize = size_of::<Vec<u8>>();
        SELF_SIZE + self.len()
    }
}

impl CacheWeight for String {
    fn cache_weight(&self) -> usize {
        const SELF_SIZE: usize = size_of::<String>();
        SELF_SIZE + self.len()
    }
}

impl CacheWeight for str {
    fn cache_weight(&self) -> usize {
        self.len()
    }
}

impl<InnerT> CacheWeight for Arc<InnerT>
where
    InnerT: CacheWeight + ?Sized,
{
    fn cache_weight(&self) -> usize {
        size_of::<Self>() + self.as_ref().cache_weight()
    }
}

impl<InnerT> CacheWeight for Rc<InnerT>
where
    InnerT: CacheWeight + ?Sized,
{
    fn cache_weight(&self) -> usize {
        size_of::<Self>() + self.as_ref().cache_weight()
    }
}

impl<InnerT> CacheWeight for Box<InnerT>
where
    InnerT: CacheWeight + ?Sized,
{
    fn cache_weight(&self) -> usize {
        size_of::<Self>() + self.as_ref().cache_weight()
    }
}
