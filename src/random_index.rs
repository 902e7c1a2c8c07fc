// An empty list selects nothing here, unlike `SamplerTable::build` where an
// empty list over a positive range means uniform weights.

use crate::rng::{AmbientRng, Rng};
use crate::sampler::SamplerTable;

fn table_for(weights: &[f32]) -> Option<SamplerTable> {
    if weights.is_empty() {
        return None;
    }
    Some(SamplerTable::build(weights, weights.len()))
}

pub fn weighted_index(weights: &[f32]) -> Option<usize> {
    table_for(weights)?.sample_with(&mut AmbientRng::new())
}

pub fn weighted_index_from_stream(weights: &[f32], stream: &mut Rng) -> Option<usize> {
    table_for(weights)?.sample_with(stream)
}

pub fn weighted_indices(weights: &[f32], count: usize) -> Vec<usize> {
    match table_for(weights) {
        Some(table) => table.sample_many(count, &mut AmbientRng::new()),
        None => Vec::new(),
    }
}

pub fn weighted_indices_from_stream(
    weights: &[f32],
    count: usize,
    stream: &mut Rng,
) -> Vec<usize> {
    match table_for(weights) {
        Some(table) => table.sample_many(count, stream),
        None => Vec::new(),
    }
}
