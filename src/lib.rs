//! Classify sign-language letters from your webcam with a hosted ONNX model.

pub mod display;
pub mod hosted;
pub mod nn;
pub mod pipeline;
pub mod region;
pub mod sensors;
