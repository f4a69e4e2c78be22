//! Batch helpers for encoder/decoder prompts.

use tracing::debug;

use crate::{
    error::{InputsError, Result},
    prompt::ExplicitEncoderDecoderPrompt,
};

pub fn pair_encoder_decoder<E, D>(
    encoder_prompt: E,
    decoder_prompt: Option<D>,
) -> ExplicitEncoderDecoderPrompt<E, D> {
    ExplicitEncoderDecoderPrompt {
        encoder_prompt,
        decoder_prompt,
    }
}

/// Pair encoder and decoder prompts by position.
///
/// Like [`Iterator::zip`], the result is as long as the shorter input and the
/// leftover prompts of the longer one are dropped. Use
/// [`try_zip_encoder_decoder_prompts`] to reject lists of different lengths.
pub fn zip_encoder_decoder_prompts<E, D, IE, ID>(
    encoder_prompts: IE,
    decoder_prompts: ID,
) -> Vec<ExplicitEncoderDecoderPrompt<E, D>>
where
    IE: IntoIterator<Item = E>,
    ID: IntoIterator<Item = Option<D>>,
{
    let mut encoder_prompts = encoder_prompts.into_iter().peekable();
    let mut decoder_prompts = decoder_prompts.into_iter();
    let pairs = encoder_prompts
        .by_ref()
        .zip(decoder_prompts.by_ref())
        .map(|(enc, dec)| pair_encoder_decoder(enc, dec))
        .collect::<Vec<_>>();

    // Neither side is drained, the longer one may be unbounded. The zip pulls the
    // encoder first, so an encoder with exactly one extra prompt goes unreported.
    let longer = if encoder_prompts.peek().is_some() {
        Some("encoder")
    } else if decoder_prompts.size_hint().0 > 0 {
        Some("decoder")
    } else {
        None
    };
    if let Some(longer) = longer {
        debug!(
            "More {longer} prompts than counterparts, truncating to {} encoder/decoder pairs.",
            pairs.len()
        );
    }
    pairs
}

/// Like [`zip_encoder_decoder_prompts`], but fails when the lists differ in length.
pub fn try_zip_encoder_decoder_prompts<E, D>(
    encoder_prompts: Vec<E>,
    decoder_prompts: Vec<Option<D>>,
) -> Result<Vec<ExplicitEncoderDecoderPrompt<E, D>>> {
    if encoder_prompts.len() != decoder_prompts.len() {
        return Err(InputsError::LengthMismatch {
            encoder: encoder_prompts.len(),
            decoder: decoder_prompts.len(),
        });
    }
    Ok(zip_encoder_decoder_prompts(encoder_prompts, decoder_prompts))
}

/// Split pairs back into `(encoder, decoder)` tuples, in order.
pub fn unzip_encoder_decoder_prompts<E, D, I>(pairs: I) -> Vec<(E, Option<D>)>
where
    I: IntoIterator<Item = ExplicitEncoderDecoderPrompt<E, D>>,
{
    pairs
        .into_iter()
        .map(|p| (p.encoder_prompt, p.decoder_prompt))
        .collect()
}
