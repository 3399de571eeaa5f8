//! Rendering predictions for the user.
//!
use anyhow::Result;

use crate::nn::Prediction;

/// Confidence a top prediction must exceed to be finalized.
pub const DEFAULT_FINALIZE_THRESHOLD: f32 = 0.7;

/// Injected display capability of the pipeline.
pub trait PredictionSink {
    fn show(&mut self, prediction: &Prediction) -> Result<()>;
}

/// The finalized character, if the top confidence strictly exceeds the
/// threshold. A top confidence of exactly the threshold yields `None`.
pub fn finalized_char(prediction: &Prediction, threshold: f32) -> Option<&str> {
    match prediction.probs.first() {
        Some(&top) if top > threshold => prediction.labels.first().map(String::as_str),
        _ => None,
    }
}

/// One formatted line per ranked prediction slot.
pub fn slot_lines(prediction: &Prediction) -> Vec<String> {
    prediction
        .labels
        .iter()
        .zip(prediction.probs.iter())
        .map(|(label, prob)| format!("{label}: {prob:.3}"))
        .collect()
}

/// Prints ranked predictions and the finalized character to stdout.
pub struct ConsoleDisplay {
    threshold: f32,
}

impl ConsoleDisplay {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl PredictionSink for ConsoleDisplay {
    fn show(&mut self, prediction: &Prediction) -> Result<()> {
        for line in slot_lines(prediction) {
            println!("{line}");
        }
        match finalized_char(prediction, self.threshold) {
            Some(letter) => println!("=> {letter}"),
            None => println!("=>"),
        }

        Ok(())
    }
}
