//! Sign-language letter classification on top of tract-onnx.
//!
use std::{
    collections::HashMap,
    io::Cursor,
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use image::RgbImage;
use reqwest::Client;
use serde::Deserialize;
use tract_onnx::prelude::*;

use crate::{
    hosted::{fetch_metadata, fetch_model_bytes, HostedUrls},
    region::CropWindow,
};

type NnModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Number of ranked predictions per inference.
pub const TOP_K: usize = 5;

/// Label table and preprocessing constants shipped next to the model.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub alphabet2int: HashMap<String, u32>,
    pub int2alphabet: HashMap<u32, String>,
    pub image_size: u32,
    #[serde(rename = "RGB_mean")]
    pub rgb_mean: [f32; 3],
}

/// Ranked classification result of a single frame.
///
/// `labels[i]` and `probs[i]` belong together; both have length [`TOP_K`]
/// and are sorted by descending confidence. `elapsed` covers preprocessing,
/// model invocation and ranking, but not the crop.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub labels: Vec<String>,
    pub probs: Vec<f32>,
    pub elapsed: Duration,
}

/// Seam between the pipeline and the opaque scoring model.
pub trait ScoreModel {
    /// Score a batched input tensor, returning one value per class.
    fn score(&self, input: Tensor) -> Result<Vec<f32>>;
}

/// Pretrained ONNX classifier, optimized and runnable.
pub struct OnnxModel {
    plan: NnModel,
}

impl OnnxModel {
    /// Build a runnable plan from serialized model bytes.
    ///
    /// The input fact is pinned to `f32 x (1, size, size, 3)`: one batched
    /// RGB image in height-width-channel order.
    pub fn from_bytes(bytes: &[u8], image_size: u32) -> Result<Self> {
        let size = image_size as usize;
        let input_fact = InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, 3));
        let plan = tract_onnx::onnx()
            .model_for_read(&mut Cursor::new(bytes))
            .context("deserializing model")?
            .with_input_fact(0, input_fact)?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { plan })
    }
}

impl ScoreModel for OnnxModel {
    fn score(&self, input: Tensor) -> Result<Vec<f32>> {
        // Output tensors stay owned by this scope and are freed on every
        // exit path once the scores are copied out.
        let outputs = self.plan.run(tvec!(input.into()))?;
        let scores = outputs[0].to_array_view::<f32>()?.iter().cloned().collect();

        Ok(scores)
    }
}

/// Classifier over a loaded model and its metadata.
///
/// A value of this type is always ready to predict: loading failures show up
/// as an `Err` from [`SignClassifier::init`] instead of a half-initialized
/// classifier.
pub struct SignClassifier<M> {
    model: M,
    metadata: Metadata,
}

impl SignClassifier<OnnxModel> {
    /// Load model and metadata from their hosted URLs and build the plan.
    pub async fn init(client: &Client, urls: &HostedUrls) -> Result<Self> {
        let model_bytes = fetch_model_bytes(client, &urls.model)
            .await
            .context("loading pretrained model failed")?;
        let metadata = fetch_metadata(client, &urls.metadata)
            .await
            .context("loading metadata failed")?;
        let model = OnnxModel::from_bytes(&model_bytes, metadata.image_size)?;

        Ok(Self::from_parts(model, metadata))
    }
}

impl<M: ScoreModel> SignClassifier<M> {
    /// Assemble a classifier from an already loaded model and metadata.
    pub fn from_parts(model: M, metadata: Metadata) -> Self {
        Self { model, metadata }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Side length of the crop window the model expects.
    pub fn crop_size(&self) -> u32 {
        self.metadata.image_size
    }

    /// Classify the crop window of `frame` and rank the top five letters.
    pub fn predict(&self, frame: &RgbImage, window: CropWindow) -> Result<Prediction> {
        ensure!(
            window.size == self.metadata.image_size,
            "crop window size {} does not match model input size {}",
            window.size,
            self.metadata.image_size
        );
        ensure!(
            window.left + window.size <= frame.width() && window.top + window.size <= frame.height(),
            "crop window {window:?} outside frame {}x{}",
            frame.width(),
            frame.height()
        );

        let crop =
            image::imageops::crop_imm(frame, window.left, window.top, window.size, window.size)
                .to_image();

        let begin = Instant::now();

        let size = window.size as usize;
        let rgb_mean = self.metadata.rgb_mean;
        let input: Tensor =
            tract_ndarray::Array4::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
                crop[(x as u32, y as u32)][c] as f32 / 255.0 - rgb_mean[c]
            })
            .into();

        let scores = self.model.score(input)?;
        ensure!(
            scores.len() == self.metadata.int2alphabet.len(),
            "model returned {} scores for {} known classes",
            scores.len(),
            self.metadata.int2alphabet.len()
        );
        ensure!(
            scores.len() >= TOP_K,
            "model returned fewer than {TOP_K} classes"
        );

        let ranked = top_k(&scores, TOP_K);
        let mut labels = Vec::with_capacity(TOP_K);
        let mut probs = Vec::with_capacity(TOP_K);
        for (class, score) in ranked {
            let label = self
                .metadata
                .int2alphabet
                .get(&(class as u32))
                .with_context(|| format!("no label for class index {class}"))?;
            labels.push(label.clone());
            probs.push(score);
        }

        let elapsed = begin.elapsed();

        Ok(Prediction {
            labels,
            probs,
            elapsed,
        })
    }
}

/// Indices and scores of the `k` highest-scoring classes, descending.
///
/// The sort is stable, so exact ties keep their class-index order.
fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().cloned().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);

    ranked
}
