use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// Controls which prompt shapes [`parse_prompt`](crate::parse_prompt) accepts.
///
/// Usually filled from the serving config:
///
/// ```toml
/// enable_prompt_embeds = true
/// allow_encoder_decoder = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PromptParseConfig {
    /// Accept `prompt_embeds`. Off unless the model can take embeddings directly.
    #[serde(default)]
    pub enable_prompt_embeds: bool,

    /// Accept `{encoder_prompt, decoder_prompt}` objects. Decoder-only models should
    /// turn this off.
    #[serde(default = "default_true")]
    pub allow_encoder_decoder: bool,
}

impl Default for PromptParseConfig {
    fn default() -> Self {
        Self {
            enable_prompt_embeds: false,
            allow_encoder_decoder: default_true(),
        }
    }
}

impl PromptParseConfig {
    pub fn with_prompt_embeds(mut self, enable: bool) -> Self {
        self.enable_prompt_embeds = enable;
        self
    }

    pub fn with_encoder_decoder(mut self, allow: bool) -> Self {
        self.allow_encoder_decoder = allow;
        self
    }
}
