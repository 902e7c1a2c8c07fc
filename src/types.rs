use serde::Serialize;

use crate::sampler::{SamplerStrategy, SamplerTable};

#[derive(Clone, Debug, PartialEq)]
pub struct SampleRequest {
    pub weights: Vec<f32>,
    pub index_range: usize,
    pub count: usize,
    pub seed: Option<u32>,
    pub strategy: SamplerStrategy,
}

#[derive(Clone, Debug, Serialize)]
pub struct SampleResponse {
    pub indices: Vec<usize>,
    #[serde(rename = "indexRange")]
    pub index_range: usize,
    #[serde(rename = "totalWeight")]
    pub total_weight: f64,
    pub strategy: SamplerStrategy,
    pub degenerate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WeightsResponse {
    pub weights: Vec<f32>,
    #[serde(rename = "totalWeight")]
    pub total_weight: f64,
    pub strategy: SamplerStrategy,
    pub degenerate: bool,
}

impl WeightsResponse {
    pub fn from_table(table: &SamplerTable) -> Self {
        let (weights, total_weight) = table.normalized_weights();
        Self {
            weights: weights.to_vec(),
            total_weight,
            strategy: table.strategy(),
            degenerate: table.is_degenerate(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct IndexFrequency {
    pub index: usize,
    pub weight: f32,
    pub count: usize,
    pub observed: f64,
    pub expected: f64,
    pub deviation: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DistributionReport {
    #[serde(rename = "generatedAtIso")]
    pub generated_at_iso: String,
    #[serde(rename = "indexRange")]
    pub index_range: usize,
    pub draws: usize,
    pub seed: u32,
    pub strategy: SamplerStrategy,
    #[serde(rename = "totalWeight")]
    pub total_weight: f64,
    #[serde(rename = "maxDeviation")]
    pub max_deviation: f64,
    pub entries: Vec<IndexFrequency>,
}
