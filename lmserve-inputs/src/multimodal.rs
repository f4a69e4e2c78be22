use std::{fmt::Debug, sync::Arc};

use candle_core::Tensor;
use image::DynamicImage;
use indexmap::IndexMap;

/// Raw audio handed to the multimodal processor.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioInput {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// One modality's worth of data, as produced by the multimodal subsystem.
#[derive(Clone, Debug)]
pub enum MultiModalData {
    Image(Vec<DynamicImage>),
    Audio(Vec<AudioInput>),
    /// Features that were already extracted upstream.
    Embeds(Tensor),
}

/// Multimodal side-data attached to a prompt, keyed by modality name (`"image"`, `"audio"`, ...).
///
/// This crate never looks inside it. Cloning is cheap and shares the payload, so a
/// dict attached to a prompt reaches the normalized inputs as the same allocation.
/// Equality is identity: two dicts are equal when they share that allocation.
#[derive(Clone, Default)]
pub struct MultiModalDataDict(Arc<IndexMap<String, MultiModalData>>);

impl MultiModalDataDict {
    pub fn new(data: IndexMap<String, MultiModalData>) -> Self {
        Self(Arc::new(data))
    }

    pub fn get(&self, modality: &str) -> Option<&MultiModalData> {
        self.0.get(modality)
    }

    pub fn modalities(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiModalData)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` if both handles point at the same payload.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for MultiModalDataDict {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Debug for MultiModalDataDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MultiModalDataDict {{ modalities: {:?} }}", self.0.keys())
    }
}

impl From<IndexMap<String, MultiModalData>> for MultiModalDataDict {
    fn from(data: IndexMap<String, MultiModalData>) -> Self {
        Self::new(data)
    }
}

impl FromIterator<(String, MultiModalData)> for MultiModalDataDict {
    fn from_iter<I: IntoIterator<Item = (String, MultiModalData)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
