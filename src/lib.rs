pub mod constants;
pub mod protocol;
pub mod random_index;
pub mod report;
pub mod rng;
pub mod sampler;
pub mod server_utils;
pub mod service;
pub mod types;
pub mod weights;

pub use random_index::{
    weighted_index, weighted_index_from_stream, weighted_indices, weighted_indices_from_stream,
};
pub use rng::{AmbientRng, Rng, UniformSource};
pub use sampler::{SamplerOptions, SamplerStrategy, SamplerTable};
pub use weights::{WeightProvider, WeightSet};
