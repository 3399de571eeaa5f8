//! Periodic capture-crop-infer-display loop.
//!
use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    display::PredictionSink,
    nn::{ScoreModel, SignClassifier},
    region::{CropWindow, RegionSelection},
    sensors::FrameSource,
};

/// Single-task inference loop over a started camera and a loaded classifier.
///
/// Each tick runs to completion before the next one is scheduled, so the
/// frame buffer, model and metadata are never accessed concurrently. A tick
/// that overruns the period delays the next tick instead of skipping it or
/// running in parallel.
pub struct Pipeline<M, D> {
    source: FrameSource,
    region: RegionSelection,
    classifier: SignClassifier<M>,
    display: D,
    period: Duration,
}

impl<M: ScoreModel, D: PredictionSink> Pipeline<M, D> {
    pub fn new(
        source: FrameSource,
        region: RegionSelection,
        classifier: SignClassifier<M>,
        display: D,
        period: Duration,
    ) -> Self {
        Self {
            source,
            region,
            classifier,
            display,
            period,
        }
    }

    /// Run until the process is torn down.
    ///
    /// A failed tick is logged and the schedule continues.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(err) = self.tick() {
                log::warn!("Inference tick failed: {err:#}");
            }
        }
    }

    fn tick(&mut self) -> Result<()> {
        let frame = self.source.snapshot()?;
        let window = CropWindow::place(
            frame.width(),
            frame.height(),
            self.classifier.crop_size(),
            &self.region,
        )?;

        let prediction = self.classifier.predict(&frame, window)?;
        log::info!(
            "Elapsed: {:.3} ms",
            prediction.elapsed.as_secs_f64() * 1000.0
        );

        self.display.show(&prediction)
    }
}
