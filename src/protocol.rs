use serde_json::Value;

use crate::constants::MAX_SERVICE_INDEX_RANGE;
use crate::sampler::SamplerStrategy;
use crate::types::SampleRequest;

// Floats are floored and a negative count reads as zero; only structurally
// unusable input is rejected.
pub fn parse_sample_request(raw: &str) -> Result<SampleRequest, &'static str> {
    let value: Value = serde_json::from_str(raw).map_err(|_| "body must be valid json")?;
    let object = value.as_object().ok_or("body must be a json object")?;

    let weights = match object.get("weights") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => parse_weights(value).ok_or("weights must be an array of numbers")?,
    };

    let index_range = match parse_optional_i64(object.get("indexRange"))
        .ok_or("indexRange must be an integer")?
    {
        None => weights.len() as i64,
        Some(range) if range < 0 => return Err("indexRange must not be negative"),
        Some(range) => range,
    };
    if index_range as u64 > MAX_SERVICE_INDEX_RANGE as u64 {
        return Err("indexRange is too large");
    }

    let count = parse_optional_i64(object.get("count"))
        .ok_or("count must be an integer")?
        .unwrap_or(1)
        .max(0) as usize;

    let seed = parse_optional_i64(object.get("seed"))
        .ok_or("seed must be an integer")?
        .map(|seed| seed as u32);

    let strategy = match object.get("strategy") {
        None | Some(Value::Null) => SamplerStrategy::Auto,
        Some(value) => value
            .as_str()
            .and_then(SamplerStrategy::parse)
            .ok_or("strategy must be one of auto, alias, cumulative")?,
    };

    Ok(SampleRequest {
        weights,
        index_range: index_range as usize,
        count,
        seed,
        strategy,
    })
}

fn parse_weights(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|entry| entry.as_f64().map(|weight| weight as f32))
        .collect()
}

fn parse_optional_i64(value: Option<&Value>) -> Option<Option<i64>> {
    const MAX_SAFE_INTEGER_F64: f64 = 9_007_199_254_740_991.0;

    let Some(value) = value else {
        return Some(None);
    };
    if value.is_null() {
        return Some(None);
    }
    if let Some(number) = value.as_i64() {
        return Some(Some(number));
    }
    if let Some(number) = value.as_u64() {
        return i64::try_from(number).ok().map(Some);
    }
    if let Some(number) = value.as_f64() {
        if number.is_finite() {
            let floored = number.floor();
            if floored.abs() > MAX_SAFE_INTEGER_F64 {
                return None;
            }
            return Some(Some(floored as i64));
        }
    }
    None
}
