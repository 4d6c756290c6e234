use crate::preprocess::{Tensor, TENSOR_SHAPE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Prediction failed: input tensor shape {0:?} does not match (1, 224, 224, 3)")]
    ShapeMismatch(Vec<usize>),
    #[error("Prediction failed: confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),
    #[error("Prediction failed: random source is unavailable")]
    RandomSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Adhesion present.
    Yes,
    /// Adhesion absent.
    No,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Yes => "Yes",
            Label::No => "No",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Probability of the positive class.
    pub probability: f64,
    /// `[negative, positive]`, sums to 1.
    pub distribution: [f64; 2],
}

impl Prediction {
    /// Builds a consistent result from a positive-class confidence.
    pub fn from_confidence(confidence: f64) -> Result<Self, PredictionError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(PredictionError::InvalidConfidence(confidence));
        }

        let label = if confidence > 0.5 { Label::Yes } else { Label::No };

        let positive = confidence;
        let negative = 1.0 - confidence;
        let total = positive + negative;
        let positive = positive / total;
        let negative = negative / total;

        Ok(Self {
            label,
            probability: positive,
            distribution: [negative, positive],
        })
    }
}

/// Anything able to classify a preprocessed tensor. Handlers only see this
/// trait, so a trained model can replace [`MockPredictor`] without touching them.
pub trait Predictor: Send + Sync {
    fn predict(&self, tensor: &Tensor) -> Result<Prediction, PredictionError>;
}

/// Stand-in for a trained model: draws the confidence uniformly from `[0, 1)`.
pub struct MockPredictor {
    rng: Mutex<StdRng>,
}

impl MockPredictor {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Predictor for MockPredictor {
    fn predict(&self, tensor: &Tensor) -> Result<Prediction, PredictionError> {
        if tensor.shape() != &TENSOR_SHAPE[..] {
            return Err(PredictionError::ShapeMismatch(tensor.shape().to_vec()));
        }

        let confidence: f64 = {
            let mut rng = self.rng.lock().map_err(|_| PredictionError::RandomSource)?;
            rng.gen()
        };

        Prediction::from_confidence(confidence)
    }
}
