//! Prompt input representation for the serving engine.
//!
//! Callers describe a request's prompt with a [`PromptType`]: text, token ids or
//! embeddings ([`SingletonPrompt`]), or an [`ExplicitEncoderDecoderPrompt`] for
//! encoder/decoder models. Preprocessing turns those into the tagged
//! [`DecoderOnlyInputs`] / [`EncoderDecoderInputs`] the rest of the engine switches
//! on, built only through [`make_token_inputs`], [`make_embed_inputs`] and
//! [`make_empty_inputs`].
//!
//! Everything here is an immutable value. Multimodal data is attached as an opaque,
//! shared [`MultiModalDataDict`] and passed along untouched.

mod config;
mod error;
mod inputs;
mod multimodal;
mod pairing;
mod parse;
mod prompt;

pub use config::PromptParseConfig;
pub use either::Either;
pub use error::{InputsError, Result};
pub use inputs::{
    make_embed_inputs, make_empty_inputs, make_token_inputs, DecoderOnlyInputs, EmbedInputs,
    EmptyInputs, EncoderDecoderInputs, InputsKind, TokenInputs,
};
pub use multimodal::{AudioInput, MultiModalData, MultiModalDataDict};
pub use pairing::{
    pair_encoder_decoder, try_zip_encoder_decoder_prompts, unzip_encoder_decoder_prompts,
    zip_encoder_decoder_prompts,
};
pub use parse::{parse_and_batch_prompt, parse_prompt};
pub use prompt::{
    EmbedsPrompt, ExplicitEncoderDecoderPrompt, PromptType, SingletonPrompt, TextPrompt,
    TokensPrompt,
};
