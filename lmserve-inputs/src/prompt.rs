//! Caller-facing prompt shapes.
//!
//! A [`PromptType`] is whatever the request-ingestion layer hands the engine: one
//! [`SingletonPrompt`] (text, token ids or embeddings) or an
//! [`ExplicitEncoderDecoderPrompt`] for sequence-to-sequence models.

use candle_core::Tensor;

use crate::multimodal::MultiModalDataDict;

/// A text prompt, tokenized before it reaches the model.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPrompt {
    pub prompt: String,
    pub multi_modal_data: Option<MultiModalDataDict>,
}

impl TextPrompt {
    pub fn new(prompt: impl ToString) -> Self {
        Self {
            prompt: prompt.to_string(),
            multi_modal_data: None,
        }
    }

    pub fn with_multi_modal_data(mut self, data: MultiModalDataDict) -> Self {
        self.multi_modal_data = Some(data);
        self
    }
}

/// An already tokenized prompt.
#[derive(Clone, Debug, PartialEq)]
pub struct TokensPrompt {
    pub prompt_token_ids: Vec<u32>,
    pub multi_modal_data: Option<MultiModalDataDict>,
}

impl TokensPrompt {
    pub fn new(prompt_token_ids: Vec<u32>) -> Self {
        Self {
            prompt_token_ids,
            multi_modal_data: None,
        }
    }

    pub fn with_multi_modal_data(mut self, data: MultiModalDataDict) -> Self {
        self.multi_modal_data = Some(data);
        self
    }
}

/// A prompt given directly as embeddings.
///
/// Equality compares tensor identity, not values: two prompts are equal when they
/// hold the same tensor.
#[derive(Clone, Debug)]
pub struct EmbedsPrompt {
    pub prompt_embeds: Tensor,
    pub multi_modal_data: Option<MultiModalDataDict>,
}

impl EmbedsPrompt {
    pub fn new(prompt_embeds: Tensor) -> Self {
        Self {
            prompt_embeds,
            multi_modal_data: None,
        }
    }

    pub fn with_multi_modal_data(mut self, data: MultiModalDataDict) -> Self {
        self.multi_modal_data = Some(data);
        self
    }
}

impl PartialEq for EmbedsPrompt {
    fn eq(&self, other: &Self) -> bool {
        self.prompt_embeds.id() == other.prompt_embeds.id()
            && self.multi_modal_data == other.multi_modal_data
    }
}

/// A prompt describing exactly one input.
///
/// Usable as the whole input of a decoder-only model, as the encoder input of an
/// encoder/decoder model when no decoder prompt is given, or as either half of an
/// [`ExplicitEncoderDecoderPrompt`].
#[derive(Clone, Debug, PartialEq)]
pub enum SingletonPrompt {
    Text(TextPrompt),
    Tokens(TokensPrompt),
    Embeds(EmbedsPrompt),
}

impl SingletonPrompt {
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Text(p) => Some(&p.prompt),
            Self::Tokens(_) | Self::Embeds(_) => None,
        }
    }

    pub fn prompt_token_ids(&self) -> Option<&[u32]> {
        match self {
            Self::Tokens(p) => Some(&p.prompt_token_ids),
            Self::Text(_) | Self::Embeds(_) => None,
        }
    }

    pub fn prompt_embeds(&self) -> Option<&Tensor> {
        match self {
            Self::Embeds(p) => Some(&p.prompt_embeds),
            Self::Text(_) | Self::Tokens(_) => None,
        }
    }

    pub fn multi_modal_data(&self) -> Option<&MultiModalDataDict> {
        match self {
            Self::Text(p) => p.multi_modal_data.as_ref(),
            Self::Tokens(p) => p.multi_modal_data.as_ref(),
            Self::Embeds(p) => p.multi_modal_data.as_ref(),
        }
    }

    /// Attach (or replace) multimodal data, keeping the prompt's shape.
    pub fn with_multi_modal_data(self, data: MultiModalDataDict) -> Self {
        match self {
            Self::Text(p) => Self::Text(p.with_multi_modal_data(data)),
            Self::Tokens(p) => Self::Tokens(p.with_multi_modal_data(data)),
            Self::Embeds(p) => Self::Embeds(p.with_multi_modal_data(data)),
        }
    }
}

impl From<TextPrompt> for SingletonPrompt {
    fn from(p: TextPrompt) -> Self {
        Self::Text(p)
    }
}

impl From<TokensPrompt> for SingletonPrompt {
    fn from(p: TokensPrompt) -> Self {
        Self::Tokens(p)
    }
}

impl From<EmbedsPrompt> for SingletonPrompt {
    fn from(p: EmbedsPrompt) -> Self {
        Self::Embeds(p)
    }
}

impl From<String> for SingletonPrompt {
    fn from(prompt: String) -> Self {
        Self::Text(TextPrompt {
            prompt,
            multi_modal_data: None,
        })
    }
}

impl From<&str> for SingletonPrompt {
    fn from(prompt: &str) -> Self {
        Self::from(prompt.to_string())
    }
}

/// An encoder prompt together with an optional decoder prompt.
///
/// The two halves need not share a shape. By convention only the encoder prompt
/// carries multimodal data; this is not checked, see
/// [`decoder_carries_multi_modal_data`](Self::decoder_carries_multi_modal_data).
/// A `None` decoder prompt means the decoder input is derived downstream. It is
/// not the same thing as [`EmptyInputs`](crate::EmptyInputs), which only exists
/// after preprocessing.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplicitEncoderDecoderPrompt<E = SingletonPrompt, D = SingletonPrompt> {
    pub encoder_prompt: E,
    pub decoder_prompt: Option<D>,
}

impl<E, D> ExplicitEncoderDecoderPrompt<E, D>
where
    E: Into<SingletonPrompt>,
    D: Into<SingletonPrompt>,
{
    /// Widen both halves to [`SingletonPrompt`].
    pub fn into_singletons(self) -> ExplicitEncoderDecoderPrompt {
        ExplicitEncoderDecoderPrompt {
            encoder_prompt: self.encoder_prompt.into(),
            decoder_prompt: self.decoder_prompt.map(Into::into),
        }
    }
}

impl ExplicitEncoderDecoderPrompt {
    pub fn decoder_carries_multi_modal_data(&self) -> bool {
        self.decoder_prompt
            .as_ref()
            .is_some_and(|p| p.multi_modal_data().is_some())
    }
}

/// Every prompt shape accepted from callers.
#[derive(Clone, Debug, PartialEq)]
pub enum PromptType {
    Singleton(SingletonPrompt),
    EncoderDecoder(ExplicitEncoderDecoderPrompt),
}

impl PromptType {
    pub fn is_explicit_encoder_decoder(&self) -> bool {
        matches!(self, Self::EncoderDecoder(_))
    }

    pub fn as_singleton(&self) -> Option<&SingletonPrompt> {
        match self {
            Self::Singleton(p) => Some(p),
            Self::EncoderDecoder(_) => None,
        }
    }

    /// View this prompt as an encoder/decoder pair. A singleton becomes the encoder
    /// prompt and the decoder prompt is left absent.
    pub fn into_explicit_encoder_decoder(self) -> ExplicitEncoderDecoderPrompt {
        match self {
            Self::Singleton(p) => ExplicitEncoderDecoderPrompt {
                encoder_prompt: p,
                decoder_prompt: None,
            },
            Self::EncoderDecoder(p) => p,
        }
    }
}

impl From<SingletonPrompt> for PromptType {
    fn from(p: SingletonPrompt) -> Self {
        Self::Singleton(p)
    }
}

impl From<TextPrompt> for PromptType {
    fn from(p: TextPrompt) -> Self {
        Self::Singleton(p.into())
    }
}

impl From<TokensPrompt> for PromptType {
    fn from(p: TokensPrompt) -> Self {
        Self::Singleton(p.into())
    }
}

impl From<EmbedsPrompt> for PromptType {
    fn from(p: EmbedsPrompt) -> Self {
        Self::Singleton(p.into())
    }
}

impl From<String> for PromptType {
    fn from(prompt: String) -> Self {
        Self::Singleton(prompt.into())
    }
}

impl From<&str> for PromptType {
    fn from(prompt: &str) -> Self {
        Self::Singleton(prompt.into())
    }
}

impl<E, D> From<ExplicitEncoderDecoderPrompt<E, D>> for PromptType
where
    E: Into<SingletonPrompt>,
    D: Into<SingletonPrompt>,
{
    fn from(p: ExplicitEncoderDecoderPrompt<E, D>) -> Self {
        Self::EncoderDecoder(p.into_singletons())
    }
}
