//! Turning request JSON into [`PromptType`] values.
//!
//! The accepted shapes are told apart by which keys are present:
//!
//! - `"text"` is a text prompt
//! - `{"prompt": "text"}`, `{"prompt_token_ids": [1, 2]}` or
//!   `{"prompt_embeds": [[0.1, 0.2]]}` is a singleton prompt; exactly one of these keys
//!   may be present
//! - `{"encoder_prompt": .., "decoder_prompt": ..}` is an encoder/decoder pair whose
//!   halves are singleton prompts; `decoder_prompt` may be omitted or `null`
//!
//! Multimodal data is produced in-process and cannot be supplied here.

use candle_core::{Device, Tensor};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    config::PromptParseConfig,
    error::{InputsError, Result},
    pairing::pair_encoder_decoder,
    prompt::{EmbedsPrompt, PromptType, SingletonPrompt, TextPrompt, TokensPrompt},
};

const PROMPT_KEY: &str = "prompt";
const TOKEN_IDS_KEY: &str = "prompt_token_ids";
const EMBEDS_KEY: &str = "prompt_embeds";
const ENCODER_KEY: &str = "encoder_prompt";
const DECODER_KEY: &str = "decoder_prompt";

const SINGLETON_KEYS: [&str; 3] = [PROMPT_KEY, TOKEN_IDS_KEY, EMBEDS_KEY];

/// Parse one prompt of any accepted shape.
pub fn parse_prompt(value: &Value, config: &PromptParseConfig) -> Result<PromptType> {
    match value {
        Value::Object(obj) if obj.contains_key(ENCODER_KEY) => {
            if !config.allow_encoder_decoder {
                return Err(InputsError::EncoderDecoderDisabled);
            }
            if let Some(key) = obj
                .keys()
                .find(|k| k.as_str() != ENCODER_KEY && k.as_str() != DECODER_KEY)
            {
                return Err(InputsError::UnsupportedField(key.clone()));
            }

            let encoder_prompt = parse_pair_half(&obj[ENCODER_KEY], ENCODER_KEY, config)?;
            let decoder_prompt = match obj.get(DECODER_KEY) {
                None | Some(Value::Null) => None,
                Some(v) => Some(parse_pair_half(v, DECODER_KEY, config)?),
            };
            trace!(
                "Parsed explicit encoder/decoder prompt (decoder prompt given: {}).",
                decoder_prompt.is_some()
            );
            Ok(pair_encoder_decoder(encoder_prompt, decoder_prompt).into())
        }
        Value::Object(obj) if obj.contains_key(DECODER_KEY) => Err(InputsError::InvalidPrompt(
            format!("`{DECODER_KEY}` given without `{ENCODER_KEY}`"),
        )),
        other => parse_singleton(other, config).map(PromptType::Singleton),
    }
}

/// Parse the `prompt` field of a completions-style request into one prompt per
/// batch entry.
///
/// Accepts a string, a list of strings, a list of token ids (a single tokenized
/// prompt) or a list of token id lists.
pub fn parse_and_batch_prompt(value: &Value) -> Result<Vec<SingletonPrompt>> {
    let batch = match BatchedPrompt::deserialize(value).map_err(|_| {
        InputsError::InvalidPrompt(
            "prompt must be a string, array of strings, array of tokens, or array of token arrays"
                .to_string(),
        )
    })? {
        BatchedPrompt::Text(text) => vec![SingletonPrompt::from(text)],
        BatchedPrompt::Texts(texts) => texts.into_iter().map(SingletonPrompt::from).collect(),
        BatchedPrompt::Tokens(ids) => vec![SingletonPrompt::from(TokensPrompt::new(ids))],
        BatchedPrompt::TokenBatch(batch) => batch
            .into_iter()
            .map(|ids| SingletonPrompt::from(TokensPrompt::new(ids)))
            .collect(),
    };
    if batch.is_empty() {
        return Err(InputsError::EmptyBatch);
    }
    debug!("Parsed a batch of {} prompts.", batch.len());
    Ok(batch)
}

/// The shapes a completions-style `prompt` field may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchedPrompt {
    Text(String),
    Texts(Vec<String>),
    Tokens(Vec<u32>),
    TokenBatch(Vec<Vec<u32>>),
}

fn parse_pair_half(
    value: &Value,
    field: &'static str,
    config: &PromptParseConfig,
) -> Result<SingletonPrompt> {
    if let Value::Object(obj) = value {
        if obj.contains_key(ENCODER_KEY) || obj.contains_key(DECODER_KEY) {
            return Err(InputsError::NestedEncoderDecoder(field));
        }
    }
    parse_singleton(value, config)
}

fn parse_singleton(value: &Value, config: &PromptParseConfig) -> Result<SingletonPrompt> {
    match value {
        Value::String(s) => Ok(SingletonPrompt::from(s.as_str())),
        Value::Object(obj) => parse_singleton_object(obj, config),
        other => Err(InputsError::InvalidPrompt(format!(
            "expected a string or an object, got `{other}`"
        ))),
    }
}

fn parse_singleton_object(
    obj: &Map<String, Value>,
    config: &PromptParseConfig,
) -> Result<SingletonPrompt> {
    if let Some(key) = obj.keys().find(|k| !SINGLETON_KEYS.contains(&k.as_str())) {
        return Err(InputsError::UnsupportedField(key.clone()));
    }

    let present = SINGLETON_KEYS
        .into_iter()
        .filter(|k| obj.contains_key(*k))
        .collect::<Vec<_>>();
    match present.as_slice() {
        [PROMPT_KEY] => match &obj[PROMPT_KEY] {
            Value::String(s) => Ok(TextPrompt::new(s).into()),
            other => Err(InputsError::InvalidPrompt(format!(
                "`{PROMPT_KEY}` must be a string, got `{other}`"
            ))),
        },
        [TOKEN_IDS_KEY] => Ok(TokensPrompt::new(parse_token_ids(&obj[TOKEN_IDS_KEY])?).into()),
        [EMBEDS_KEY] => {
            if !config.enable_prompt_embeds {
                return Err(InputsError::EmbedsDisabled);
            }
            Ok(EmbedsPrompt::new(parse_embeds(&obj[EMBEDS_KEY])?).into())
        }
        [] => Err(InputsError::InvalidPrompt(format!(
            "expected one of `{PROMPT_KEY}`, `{TOKEN_IDS_KEY}` or `{EMBEDS_KEY}`"
        ))),
        many => Err(InputsError::InvalidPrompt(format!(
            "only one of `{PROMPT_KEY}`, `{TOKEN_IDS_KEY}` or `{EMBEDS_KEY}` may be given, got {}",
            many.join(", ")
        ))),
    }
}

fn parse_token_ids(value: &Value) -> Result<Vec<u32>> {
    let Value::Array(items) = value else {
        return Err(InputsError::InvalidPrompt(format!(
            "`{TOKEN_IDS_KEY}` must be an array of integers, got `{value}`"
        )));
    };
    items
        .iter()
        .map(|id| {
            id.as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .ok_or_else(|| InputsError::InvalidTokenId(id.clone()))
        })
        .collect()
}

/// Build an f32 CPU tensor from nested arrays. The shape is taken from the first
/// element at each depth and every other element must match it.
fn parse_embeds(value: &Value) -> Result<Tensor> {
    let mut shape = Vec::new();
    let mut cur = value;
    while let Value::Array(items) = cur {
        shape.push(items.len());
        match items.first() {
            Some(first) => cur = first,
            None => break,
        }
    }
    if shape.is_empty() {
        return Err(InputsError::InvalidPrompt(format!(
            "`{EMBEDS_KEY}` must be an array, got `{value}`"
        )));
    }

    // Not pre-sized: the shape is unchecked until the walk below.
    let mut data = Vec::new();
    flatten_embeds(value, &shape, &mut data)?;
    trace!("Parsed prompt embeddings of shape {shape:?}.");
    Ok(Tensor::from_vec(data, shape, &Device::Cpu)?)
}

fn flatten_embeds(value: &Value, shape: &[usize], out: &mut Vec<f32>) -> Result<()> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(InputsError::RaggedEmbeddings {
                    expected: len,
                    found: items.len(),
                });
            }
            for item in items {
                flatten_embeds(item, rest, out)?;
            }
            Ok(())
        }
        (Value::Number(n), None) => {
            let x = n.as_f64().ok_or_else(|| {
                InputsError::InvalidPrompt(format!("`{n}` is not a valid embedding value"))
            })?;
            let x = x as f32;
            if !x.is_finite() {
                return Err(InputsError::InvalidPrompt(format!(
                    "`{n}` does not fit in an f32 embedding value"
                )));
            }
            out.push(x);
            Ok(())
        }
        (other, _) => Err(InputsError::InvalidPrompt(format!(
            "`{EMBEDS_KEY}` must be a rectangular nested array of numbers, found `{other}`"
        ))),
    }
}
