pub const DEFAULT_PORT: u16 = 8080;

/// `SamplerStrategy::Auto` builds a cumulative table up to this many indices.
pub const CUMULATIVE_MAX_LEN: usize = 16;

pub const DEFAULT_SERVICE_MAX_COUNT: usize = 100_000;
pub const DEFAULT_SIMULATION_COUNT: usize = 100_000;
pub const DEFAULT_TOLERANCE: f64 = 0.02;
pub const MAX_SERVICE_INDEX_RANGE: usize = 1_000_000;
