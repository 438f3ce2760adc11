use super::super::error::*;

use {bytes::*, std::sync::*};

//
// Decoder
//

/// Turns raw bytes into a decoded asset.
///
/// Decoding is synchronous. The loader runs it on Tokio's blocking pool by default, so
/// CPU-heavy decoders (images) do not stall the runtime.
pub trait Decoder
where
    Self: 'static + Send + Sync,
{
    /// Decoded asset.
    ///
    /// Cloned once per waiter and once for the cache, so it should be cheap to clone, e.g. an
    /// [Arc].
    type Asset: 'static + Clone + Send + Sync;

    /// Decode.
    fn decode(&self, bytes: Bytes) -> Result<Self::Asset, DecodeError>;
}

impl<DecoderT> Decoder for Arc<DecoderT>
where
    DecoderT: Decoder,
{
    type Asset = DecoderT::Asset;

    fn decode(&self, bytes: Bytes) -> Result<Self::Asset, DecodeError> {
        self.as_ref().decode(bytes)
    }
}

//
// DecoderFn
//

/// [Decoder] implemented by a function.
#[derive(Clone, Debug)]
pub struct DecoderFn<FunctionT>(pub FunctionT);

/// Create a [Decoder] from a function.
pub fn decoder_fn<AssetT, FunctionT>(function: FunctionT) -> DecoderFn<FunctionT>
where
    FunctionT: Fn(Bytes) -> Result<AssetT, DecodeError>,
{
    DecoderFn(function)
}

impl<AssetT, FunctionT> Decoder for DecoderFn<FunctionT>
where
    AssetT: 'static + Clone + Send + Sync,
    FunctionT: 'static + Fn(Bytes) -> Result<AssetT, DecodeError> + Send + Sync,
{
    type Asset = AssetT;

    fn decode(&self, bytes: Bytes) -> Result<Self::Asset, DecodeError> {
        (self.0)(bytes)
    }
}

//
// BytesDecoder
//

/// [Decoder] that keeps the raw bytes as the asset.
///
/// Useful when decoding happens elsewhere (e.g. on the GPU) and only the download needs caching.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesDecoder;

impl Decoder for BytesDecoder {
    type Asset = Bytes;

    fn decode(&self, bytes: Bytes) -> Result<Self::Asset, DecodeError> {
        Ok(bytes)
    }
}
