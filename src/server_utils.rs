use crate::constants::{DEFAULT_PORT, DEFAULT_SERVICE_MAX_COUNT};

pub fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn parse_max_count(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_SERVICE_MAX_COUNT)
}

pub fn normalize_count(requested: usize, max_count: usize) -> usize {
    requested.min(max_count)
}
