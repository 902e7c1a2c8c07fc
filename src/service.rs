use crate::rng::{AmbientRng, Rng};
use crate::sampler::{SamplerOptions, SamplerTable};
use crate::server_utils::normalize_count;
use crate::types::{SampleRequest, SampleResponse, WeightsResponse};

pub fn build_table(request: &SampleRequest) -> SamplerTable {
    SamplerTable::with_options(
        &request.weights,
        request.index_range,
        SamplerOptions::with_strategy(request.strategy),
    )
}

pub fn run_sample(request: &SampleRequest, max_count: usize) -> SampleResponse {
    let table = build_table(request);
    let count = normalize_count(request.count, max_count);
    let indices = match request.seed {
        Some(seed) => table.sample_many(count, &mut Rng::new(seed)),
        None => table.sample_many(count, &mut AmbientRng::new()),
    };
    let (_, total_weight) = table.normalized_weights();
    SampleResponse {
        indices,
        index_range: table.len(),
        total_weight,
        strategy: table.strategy(),
        degenerate: table.is_degenerate(),
        seed: request.seed,
    }
}

pub fn describe_weights(request: &SampleRequest) -> WeightsResponse {
    WeightsResponse::from_table(&build_table(request))
}
