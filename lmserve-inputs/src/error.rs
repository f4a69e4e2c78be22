//! Error types for prompt ingestion and pairing.

use thiserror::Error;

/// Error type for this crate.
///
/// Building prompts and normalized inputs from typed values never fails. These
/// variants come from the fallible edges: strict pairing, kind-name parsing and
/// JSON prompt ingestion.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputsError {
    /// Strict zipping was given encoder and decoder lists of different lengths.
    #[error("got {encoder} encoder prompts but {decoder} decoder prompts")]
    LengthMismatch { encoder: usize, decoder: usize },

    /// An inputs type tag that is not `token`, `embed` or `empty`.
    #[error("unknown inputs type `{0}`")]
    UnknownKind(String),

    /// The value does not match any accepted prompt shape.
    #[error("invalid prompt: {0}")]
    InvalidPrompt(String),

    /// A token id that is not a non-negative integer fitting in `u32`.
    #[error("`{0}` is not a valid token id")]
    InvalidTokenId(serde_json::Value),

    /// Nested embedding arrays whose rows differ in length.
    #[error("prompt embeddings must be rectangular, found a row of length {found} where {expected} was expected")]
    RaggedEmbeddings { expected: usize, found: usize },

    #[error("prompt embeddings are disabled, set `enable_prompt_embeds` to accept them")]
    EmbedsDisabled,

    #[error("explicit encoder/decoder prompts are not accepted by this model")]
    EncoderDecoderDisabled,

    /// `encoder_prompt` or `decoder_prompt` was itself an encoder/decoder pair.
    #[error("`{0}` must be a singleton prompt, not an encoder/decoder pair")]
    NestedEncoderDecoder(&'static str),

    #[error("field `{0}` cannot be supplied here")]
    UnsupportedField(String),

    #[error("please provide at least one prompt")]
    EmptyBatch,

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),
}

/// Convenience type alias for `std::result::Result<T, InputsError>`.
pub type Result<T> = std::result::Result<T, InputsError>;
