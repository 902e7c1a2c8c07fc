use chrono::{SecondsFormat, Utc};

use crate::sampler::SamplerTable;
use crate::types::{DistributionReport, IndexFrequency};

pub fn build_report(table: &SamplerTable, indices: &[usize], seed: u32) -> DistributionReport {
    let (weights, total_weight) = table.normalized_weights();
    let mut counts = vec![0usize; weights.len()];
    for &index in indices {
        if let Some(count) = counts.get_mut(index) {
            *count += 1;
        }
    }

    let draws = indices.len();
    let entries: Vec<IndexFrequency> = weights
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (&weight, count))| {
            let observed = if draws == 0 {
                0.0
            } else {
                count as f64 / draws as f64
            };
            let expected = expected_frequency(table, index, weight, total_weight);
            IndexFrequency {
                index,
                weight,
                count,
                observed,
                expected,
                deviation: (observed - expected).abs(),
            }
        })
        .collect();
    let max_deviation = entries
        .iter()
        .map(|entry| entry.deviation)
        .fold(0.0, f64::max);

    DistributionReport {
        generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        index_range: weights.len(),
        draws,
        seed,
        strategy: table.strategy(),
        total_weight,
        max_deviation,
        entries,
    }
}

pub fn collect_anomalies(report: &DistributionReport, tolerance: f64) -> Vec<String> {
    if report.draws == 0 {
        return Vec::new();
    }
    report
        .entries
        .iter()
        .filter(|entry| entry.deviation > tolerance)
        .map(|entry| {
            format!(
                "index {} observed {:.4} expected {:.4}",
                entry.index, entry.observed, entry.expected
            )
        })
        .collect()
}

fn expected_frequency(table: &SamplerTable, index: usize, weight: f32, total_weight: f64) -> f64 {
    if table.is_degenerate() {
        return if index == 0 { 1.0 } else { 0.0 };
    }
    weight as f64 / total_weight
}
