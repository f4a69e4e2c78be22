//! Normalized inputs, as consumed by the engine after preprocessing.
//!
//! Every value here is tagged with an [`InputsKind`]. The records keep their fields
//! private so the `make_*` constructors are the only way to build them, which keeps
//! the tag and the populated fields in agreement.

use std::{fmt::Display, str::FromStr};

use candle_core::Tensor;
use either::Either;
use serde::Serialize;

use crate::{error::InputsError, multimodal::MultiModalDataDict};

/// Discriminant of a normalized input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputsKind {
    Token,
    Embed,
    Empty,
}

impl InputsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Embed => "embed",
            Self::Empty => "empty",
        }
    }
}

impl Display for InputsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InputsKind {
    type Err = InputsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(Self::Token),
            "embed" => Ok(Self::Embed),
            "empty" => Ok(Self::Empty),
            other => Err(InputsError::UnknownKind(other.to_string())),
        }
    }
}

/// Token-based inputs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename = "token")]
pub struct TokenInputs {
    prompt_token_ids: Vec<u32>,
    /// Original text the token ids came from, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(skip)]
    multi_modal_data: Option<MultiModalDataDict>,
}

impl TokenInputs {
    pub fn kind(&self) -> InputsKind {
        InputsKind::Token
    }

    pub fn prompt_token_ids(&self) -> &[u32] {
        &self.prompt_token_ids
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn multi_modal_data(&self) -> Option<&MultiModalDataDict> {
        self.multi_modal_data.as_ref()
    }

    pub fn into_prompt_token_ids(self) -> Vec<u32> {
        self.prompt_token_ids
    }
}

/// Embedding-based inputs.
#[derive(Clone, Debug)]
pub struct EmbedInputs {
    prompt_embeds: Tensor,
    multi_modal_data: Option<MultiModalDataDict>,
}

impl EmbedInputs {
    pub fn kind(&self) -> InputsKind {
        InputsKind::Embed
    }

    pub fn prompt_embeds(&self) -> &Tensor {
        &self.prompt_embeds
    }

    pub fn multi_modal_data(&self) -> Option<&MultiModalDataDict> {
        self.multi_modal_data.as_ref()
    }
}

// Same tensor, same multimodal payload.
impl PartialEq for EmbedInputs {
    fn eq(&self, other: &Self) -> bool {
        self.prompt_embeds.id() == other.prompt_embeds.id()
            && self.multi_modal_data == other.multi_modal_data
    }
}

/// Marks a decoder side for which no prompt was supplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "empty")]
#[non_exhaustive]
pub struct EmptyInputs {}

impl EmptyInputs {
    pub fn kind(&self) -> InputsKind {
        InputsKind::Empty
    }
}

/// Build [`TokenInputs`]. `prompt` and `multi_modal_data` are kept only when given.
pub fn make_token_inputs(
    prompt_token_ids: Vec<u32>,
    prompt: Option<String>,
    multi_modal_data: Option<MultiModalDataDict>,
) -> TokenInputs {
    TokenInputs {
        prompt_token_ids,
        prompt,
        multi_modal_data,
    }
}

/// Build [`EmbedInputs`]. `multi_modal_data` is kept only when given.
pub fn make_embed_inputs(
    prompt_embeds: Tensor,
    multi_modal_data: Option<MultiModalDataDict>,
) -> EmbedInputs {
    EmbedInputs {
        prompt_embeds,
        multi_modal_data,
    }
}

pub fn make_empty_inputs() -> EmptyInputs {
    EmptyInputs {}
}

/// Inputs for a decoder-only model, right before they go to the model executor.
#[derive(Clone, Debug, PartialEq)]
pub enum DecoderOnlyInputs {
    Token(TokenInputs),
    Embed(EmbedInputs),
}

impl DecoderOnlyInputs {
    pub fn kind(&self) -> InputsKind {
        match self {
            Self::Token(i) => i.kind(),
            Self::Embed(i) => i.kind(),
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Token(i) => i.prompt(),
            Self::Embed(_) => None,
        }
    }

    pub fn prompt_token_ids(&self) -> Option<&[u32]> {
        match self {
            Self::Token(i) => Some(i.prompt_token_ids()),
            Self::Embed(_) => None,
        }
    }

    pub fn prompt_embeds(&self) -> Option<&Tensor> {
        match self {
            Self::Token(_) => None,
            Self::Embed(i) => Some(i.prompt_embeds()),
        }
    }

    pub fn multi_modal_data(&self) -> Option<&MultiModalDataDict> {
        match self {
            Self::Token(i) => i.multi_modal_data(),
            Self::Embed(i) => i.multi_modal_data(),
        }
    }
}

impl From<TokenInputs> for DecoderOnlyInputs {
    fn from(inputs: TokenInputs) -> Self {
        Self::Token(inputs)
    }
}

impl From<EmbedInputs> for DecoderOnlyInputs {
    fn from(inputs: EmbedInputs) -> Self {
        Self::Embed(inputs)
    }
}

/// Inputs for an encoder/decoder model, right before they go to the model executor.
///
/// The decoder side is either [`EmptyInputs`] (left) or [`TokenInputs`] (right).
/// There is no embeddings-based decoder side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncoderDecoderInputs {
    pub encoder: TokenInputs,
    #[serde(with = "either::serde_untagged")]
    pub decoder: Either<EmptyInputs, TokenInputs>,
}

impl EncoderDecoderInputs {
    pub fn new(encoder: TokenInputs, decoder: Either<EmptyInputs, TokenInputs>) -> Self {
        Self { encoder, decoder }
    }

    /// Encoder inputs with an [`EmptyInputs`] decoder side.
    pub fn encoder_only(encoder: TokenInputs) -> Self {
        Self::new(encoder, Either::Left(make_empty_inputs()))
    }

    pub fn decoder_kind(&self) -> InputsKind {
        match &self.decoder {
            Either::Left(empty) => empty.kind(),
            Either::Right(tokens) => tokens.kind(),
        }
    }

    pub fn decoder_token_ids(&self) -> Option<&[u32]> {
        self.decoder.as_ref().right().map(TokenInputs::prompt_token_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multimodal::{MultiModalData, MultiModalDataDict};
    use candle_core::{DType, Device};
    use serde_json::json;

    #[test]
    fn token_inputs_omit_absent_fields() {
        let inputs = make_token_inputs(vec![1, 2, 3], None, None);
        assert_eq!(inputs.kind(), InputsKind::Token);
        assert_eq!(inputs.prompt_token_ids(), &[1, 2, 3]);
        assert!(inputs.prompt().is_none());
        assert!(inputs.multi_modal_data().is_none());
        assert_eq!(
            serde_json::to_value(&inputs).unwrap(),
            json!({ "type": "token", "prompt_token_ids": [1, 2, 3] })
        );
    }

    #[test]
    fn token_inputs_keep_supplied_fields() {
        let dict = MultiModalDataDict::from_iter([(
            "embeds".to_string(),
            MultiModalData::Embeds(Tensor::zeros((1, 2), DType::F32, &Device::Cpu).unwrap()),
        )]);
        let inputs = make_token_inputs(vec![7], Some("seven".to_string()), Some(dict.clone()));
        assert_eq!(inputs.prompt(), Some("seven"));
        assert!(inputs.multi_modal_data().unwrap().ptr_eq(&dict));
        // multimodal payloads are opaque and never serialized
        assert_eq!(
            serde_json::to_value(&inputs).unwrap(),
            json!({ "type": "token", "prompt_token_ids": [7], "prompt": "seven" })
        );
    }

    #[test]
    fn embed_inputs_hold_the_given_tensor() {
        let embeds = Tensor::ones((3, 8), DType::F32, &Device::Cpu).unwrap();
        let inputs = make_embed_inputs(embeds.clone(), None);
        assert_eq!(inputs.kind(), InputsKind::Embed);
        assert_eq!(inputs.prompt_embeds().id(), embeds.id());
        assert!(inputs.multi_modal_data().is_none());
    }

    #[test]
    fn embed_inputs_keep_the_given_multi_modal_data() {
        let embeds = Tensor::ones((2, 4), DType::F32, &Device::Cpu).unwrap();
        let dict = MultiModalDataDict::from_iter([(
            "image_embeds".to_string(),
            MultiModalData::Embeds(Tensor::zeros((1, 4), DType::F32, &Device::Cpu).unwrap()),
        )]);
        let inputs = make_embed_inputs(embeds.clone(), Some(dict.clone()));
        assert_eq!(inputs.prompt_embeds().id(), embeds.id());
        assert!(inputs.multi_modal_data().unwrap().ptr_eq(&dict));

        let inputs = DecoderOnlyInputs::from(inputs);
        assert!(inputs.multi_modal_data().unwrap().ptr_eq(&dict));
    }

    #[test]
    fn empty_inputs_are_constant() {
        assert_eq!(make_empty_inputs(), make_empty_inputs());
        assert_eq!(make_empty_inputs().kind(), InputsKind::Empty);
        assert_eq!(
            serde_json::to_value(make_empty_inputs()).unwrap(),
            json!({ "type": "empty" })
        );
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [InputsKind::Token, InputsKind::Embed, InputsKind::Empty] {
            assert_eq!(kind.to_string().parse::<InputsKind>().unwrap(), kind);
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
        assert!(matches!(
            "tokens".parse::<InputsKind>(),
            Err(InputsError::UnknownKind(k)) if k == "tokens"
        ));
    }

    #[test]
    fn decoder_only_dispatches_on_kind() {
        let tokens = DecoderOnlyInputs::from(make_token_inputs(vec![4], Some("x".into()), None));
        assert_eq!(tokens.kind(), InputsKind::Token);
        assert_eq!(tokens.prompt(), Some("x"));
        assert_eq!(tokens.prompt_token_ids(), Some(&[4][..]));
        assert!(tokens.prompt_embeds().is_none());

        let t = Tensor::zeros((1, 4), DType::F32, &Device::Cpu).unwrap();
        let embeds = DecoderOnlyInputs::from(make_embed_inputs(t, None));
        assert_eq!(embeds.kind(), InputsKind::Embed);
        assert!(embeds.prompt().is_none());
        assert!(embeds.prompt_token_ids().is_none());
        assert_eq!(embeds.prompt_embeds().unwrap().dims(), &[1, 4]);
    }

    #[test]
    fn encoder_decoder_serializes_decoder_untagged() {
        let enc = make_token_inputs(vec![5, 6], None, None);
        let inputs = EncoderDecoderInputs::encoder_only(enc.clone());
        assert_eq!(inputs.decoder_kind(), InputsKind::Empty);
        assert!(inputs.decoder_token_ids().is_none());
        assert_eq!(
            serde_json::to_value(&inputs).unwrap(),
            json!({
                "encoder": { "type": "token", "prompt_token_ids": [5, 6] },
                "decoder": { "type": "empty" }
            })
        );

        let inputs = EncoderDecoderInputs::new(enc, Either::Right(make_token_inputs(vec![0], None, None)));
        assert_eq!(inputs.decoder_kind(), InputsKind::Token);
        assert_eq!(inputs.decoder_token_ids(), Some(&[0][..]));
        assert_eq!(
            serde_json::to_value(&inputs).unwrap()["decoder"],
            json!({ "type": "token", "prompt_token_ids": [0] })
        );
    }
}
