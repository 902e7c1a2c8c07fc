use serde::{Deserialize, Serialize};

use crate::constants::CUMULATIVE_MAX_LEN;
use crate::rng::UniformSource;
use crate::weights::{WeightProvider, WeightSet};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerStrategy {
    #[default]
    Auto,
    Alias,
    Cumulative,
}

impl SamplerStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Self::Auto),
            "alias" => Some(Self::Alias),
            "cumulative" => Some(Self::Cumulative),
            _ => None,
        }
    }

    fn resolve(self, len: usize, cumulative_max_len: usize) -> Self {
        match self {
            Self::Auto if len <= cumulative_max_len => Self::Cumulative,
            Self::Auto => Self::Alias,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SamplerOptions {
    pub strategy: SamplerStrategy,
    pub cumulative_max_len: usize,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            strategy: SamplerStrategy::Auto,
            cumulative_max_len: CUMULATIVE_MAX_LEN,
        }
    }
}

impl SamplerOptions {
    pub fn with_strategy(strategy: SamplerStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
enum Lookup {
    Empty,
    Degenerate,
    Alias {
        prob: Vec<f32>,
        alias: Vec<usize>,
    },
    Cumulative {
        cumulative: Vec<f64>,
        last_positive: usize,
    },
}

#[derive(Clone, Debug)]
pub struct SamplerTable {
    weights: WeightSet,
    strategy: SamplerStrategy,
    lookup: Lookup,
}

impl SamplerTable {
    pub fn build(weights: &[f32], index_range: usize) -> Self {
        Self::with_options(weights, index_range, SamplerOptions::default())
    }

    pub fn with_options(weights: &[f32], index_range: usize, options: SamplerOptions) -> Self {
        Self::from_weight_set(WeightSet::new(index_range, weights), options)
    }

    pub fn from_weight_set(weights: WeightSet, options: SamplerOptions) -> Self {
        let strategy = options
            .strategy
            .resolve(weights.len(), options.cumulative_max_len);
        let lookup = build_lookup(&weights, strategy);
        Self {
            weights,
            strategy,
            lookup,
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn strategy(&self) -> SamplerStrategy {
        self.strategy
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.lookup, Lookup::Empty | Lookup::Degenerate)
    }

    pub fn weight_set(&self) -> &WeightSet {
        &self.weights
    }

    pub fn normalized_weights(&self) -> (&[f32], f64) {
        self.weights.weights()
    }

    /// Out-of-range draws are clamped: a low or NaN `u1` lands on the first
    /// slot, a high one on the last selectable index.
    pub fn sample_one(&self, u1: f32, u2: f32) -> Option<usize> {
        match &self.lookup {
            Lookup::Empty => None,
            Lookup::Degenerate => Some(0),
            Lookup::Alias { prob, alias } => {
                let n = prob.len();
                let slot = ((u1 as f64 * n as f64) as usize).min(n - 1);
                if u2.max(0.0) < prob[slot] {
                    Some(slot)
                } else {
                    Some(alias[slot])
                }
            }
            Lookup::Cumulative {
                cumulative,
                last_positive,
            } => {
                let total = cumulative.last().copied().unwrap_or(0.0);
                let target = u1.max(0.0) as f64 * total;
                // Ranges are half-open, so an index whose range is empty is never hit.
                let index = cumulative.partition_point(|&c| c <= target);
                if index < cumulative.len() {
                    Some(index)
                } else {
                    Some(*last_positive)
                }
            }
        }
    }

    // Both strategies consume two draws so seeded streams stay aligned.
    pub fn sample_with<S: UniformSource + ?Sized>(&self, source: &mut S) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let u1 = source.next_f32();
        let u2 = source.next_f32();
        self.sample_one(u1, u2)
    }

    pub fn sample_many<S: UniformSource + ?Sized>(
        &self,
        count: usize,
        source: &mut S,
    ) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(index) = self.sample_with(source) {
                indices.push(index);
            }
        }
        indices
    }
}

fn build_lookup<P: WeightProvider>(provider: &P, strategy: SamplerStrategy) -> Lookup {
    let (weights, total) = provider.weights();
    if weights.is_empty() {
        return Lookup::Empty;
    }
    if total <= 0.0 {
        return Lookup::Degenerate;
    }
    match strategy {
        SamplerStrategy::Cumulative => build_cumulative(weights),
        SamplerStrategy::Alias | SamplerStrategy::Auto => build_alias(weights, total),
    }
}

fn build_cumulative(weights: &[f32]) -> Lookup {
    let mut cumulative = Vec::with_capacity(weights.len());
    let mut running = 0.0f64;
    let mut last_positive = 0;
    for (i, &weight) in weights.iter().enumerate() {
        running += weight as f64;
        cumulative.push(running);
        if weight > 0.0 {
            last_positive = i;
        }
    }
    Lookup::Cumulative {
        cumulative,
        last_positive,
    }
}

// Vose's alias method.
fn build_alias(weights: &[f32], total: f64) -> Lookup {
    let n = weights.len();
    let mut scaled: Vec<f64> = weights
        .iter()
        .map(|&w| w as f64 * n as f64 / total)
        .collect();
    let mut prob = vec![1.0f32; n];
    let mut alias: Vec<usize> = (0..n).collect();

    let mut small = Vec::with_capacity(n);
    let mut large = Vec::with_capacity(n);
    for (i, &p) in scaled.iter().enumerate() {
        if p < 1.0 {
            small.push(i);
        } else {
            large.push(i);
        }
    }

    while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
        small.pop();
        large.pop();
        prob[s] = scaled[s] as f32;
        alias[s] = l;
        scaled[l] -= 1.0 - scaled[s];
        if scaled[l] < 1.0 {
            small.push(l);
        } else {
            large.push(l);
        }
    }

    // Leftovers are rounding residue and keep their own slot, except zero
    // weights, which must always redirect.
    let first_positive = weights.iter().position(|&w| w > 0.0).unwrap_or(0);
    for i in small.into_iter().chain(large) {
        if weights[i] > 0.0 {
            prob[i] = 1.0;
            alias[i] = i;
        } else {
            prob[i] = 0.0;
            alias[i] = first_positive;
        }
    }

    Lookup::Alias { prob, alias }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    const STRATEGIES: [SamplerStrategy; 2] =
        [SamplerStrategy::Alias, SamplerStrategy::Cumulative];

    fn table(weights: &[f32], strategy: SamplerStrategy) -> SamplerTable {
        SamplerTable::with_options(
            weights,
            weights.len(),
            SamplerOptions::with_strategy(strategy),
        )
    }

    fn frequencies(table: &SamplerTable, draws: usize, seed: u32) -> Vec<f64> {
        let mut counts = vec![0usize; table.len()];
        let mut rng = Rng::new(seed);
        for index in table.sample_many(draws, &mut rng) {
            counts[index] += 1;
        }
        counts
            .into_iter()
            .map(|count| count as f64 / draws as f64)
            .collect()
    }

    #[test]
    fn auto_strategy_switches_on_length() {
        let short = SamplerTable::build(&[1.0; 4], 4);
        assert_eq!(short.strategy(), SamplerStrategy::Cumulative);
        let long = SamplerTable::build(&[], CUMULATIVE_MAX_LEN + 1);
        assert_eq!(long.strategy(), SamplerStrategy::Alias);
    }

    #[test]
    fn strategy_parse_accepts_known_names() {
        assert_eq!(SamplerStrategy::parse("alias"), Some(SamplerStrategy::Alias));
        assert_eq!(
            SamplerStrategy::parse("cumulative"),
            Some(SamplerStrategy::Cumulative)
        );
        assert_eq!(SamplerStrategy::parse("auto"), Some(SamplerStrategy::Auto));
        assert_eq!(SamplerStrategy::parse("walker"), None);
    }

    #[test]
    fn normalized_weights_are_stable_across_builds() {
        for strategy in STRATEGIES {
            for _ in 0..3 {
                let table = table(&[2.0, 4.0, 0.0, 6.0], strategy);
                assert_eq!(table.normalized_weights(), (&[2.0, 4.0, 0.0, 6.0][..], 12.0));
            }
        }
    }

    #[test]
    fn uniform_fallback_reports_unit_weights() {
        let table = SamplerTable::build(&[], 4);
        assert_eq!(table.normalized_weights(), (&[1.0, 1.0, 1.0, 1.0][..], 4.0));
    }

    #[test]
    fn negative_weights_are_clamped_in_table() {
        let table = SamplerTable::build(&[-3.0, 5.0], 2);
        assert_eq!(table.normalized_weights(), (&[0.0, 5.0][..], 5.0));
    }

    #[test]
    fn all_zero_table_falls_back_to_first_index() {
        for strategy in STRATEGIES {
            let table = table(&[0.0, 0.0, 0.0], strategy);
            assert!(table.is_degenerate());
            for (u1, u2) in [(0.0, 0.0), (0.5, 0.5), (0.999, 0.999)] {
                assert_eq!(table.sample_one(u1, u2), Some(0));
            }
            let mut rng = Rng::new(3);
            assert!(table.sample_many(100, &mut rng).iter().all(|&i| i == 0));
        }
    }

    #[test]
    fn empty_table_has_no_selection() {
        let table = SamplerTable::build(&[], 0);
        assert!(table.is_empty());
        assert_eq!(table.sample_one(0.5, 0.5), None);
        let mut rng = Rng::new(1);
        assert!(table.sample_many(5, &mut rng).is_empty());
    }

    #[test]
    fn zero_count_batch_is_empty() {
        let table = SamplerTable::build(&[1.0, 2.0], 2);
        let mut rng = Rng::new(1);
        assert!(table.sample_many(0, &mut rng).is_empty());
    }

    #[test]
    fn uniform_weights_converge() {
        for strategy in STRATEGIES {
            let table = table(&[1.0, 1.0, 1.0, 1.0], strategy);
            for (index, freq) in frequencies(&table, 100_000, 2024).into_iter().enumerate() {
                assert!((freq - 0.25).abs() < 0.02, "{strategy:?} index {index}: {freq}");
            }
        }
    }

    #[test]
    fn skewed_weights_converge() {
        let weights = [1.0, 2.0, 3.0, 4.0];
        for strategy in STRATEGIES {
            let table = table(&weights, strategy);
            for (index, freq) in frequencies(&table, 100_000, 77).into_iter().enumerate() {
                let expected = weights[index] as f64 / 10.0;
                assert!((freq - expected).abs() < 0.02, "{strategy:?} index {index}: {freq}");
            }
        }
    }

    #[test]
    fn huge_weights_keep_finite_total_and_even_split() {
        for strategy in STRATEGIES {
            let table = table(&[3.0e38, 3.0e38], strategy);
            let (_, total) = table.normalized_weights();
            assert!(total.is_finite());
            for (index, freq) in frequencies(&table, 20_000, 31).into_iter().enumerate() {
                assert!((freq - 0.5).abs() < 0.02, "{strategy:?} index {index}: {freq}");
            }
        }
    }

    #[test]
    fn zero_weight_index_is_never_drawn() {
        for strategy in STRATEGIES {
            let table = table(&[0.0, 10.0], strategy);
            let mut rng = Rng::new(11);
            assert!(table.sample_many(10_000, &mut rng).iter().all(|&i| i == 1));
            assert_eq!(table.sample_one(0.0, 0.0), Some(1));
        }
    }

    #[test]
    fn trailing_zero_weights_are_skipped_for_out_of_range_draws() {
        for strategy in STRATEGIES {
            let table = table(&[3.0, 1.0, 0.0, 0.0], strategy);
            let picked = table.sample_one(1.5, 0.0).expect("non-empty table");
            assert!(picked < 2, "{strategy:?} picked zero-weight index {picked}");
            let picked = table.sample_one(-0.5, -0.5).expect("non-empty table");
            assert!(picked < 2, "{strategy:?} picked zero-weight index {picked}");
        }
    }

    #[test]
    fn sparse_weights_never_hit_zero_entries() {
        let mut weights = vec![0.0f32; 64];
        weights[5] = 1.0;
        weights[40] = 0.25;
        weights[63] = 3.0;
        for strategy in STRATEGIES {
            let table = table(&weights, strategy);
            let mut rng = Rng::new(5);
            for index in table.sample_many(20_000, &mut rng) {
                assert!(weights[index] > 0.0, "{strategy:?} drew zero-weight index {index}");
            }
        }
    }

    #[test]
    fn queries_stay_in_bounds() {
        let weights: Vec<f32> = (0..257).map(|i| (i % 7) as f32 + 0.5).collect();
        for strategy in STRATEGIES {
            let table = table(&weights, strategy);
            let mut rng = Rng::new(8);
            for _ in 0..10_000 {
                let index = table.sample_with(&mut rng).expect("non-empty table");
                assert!(index < weights.len());
            }
            for (u1, u2) in [(0.0, 0.0), (0.999_999, 0.999_999), (1.0, 1.0), (f32::NAN, f32::NAN)] {
                let index = table.sample_one(u1, u2).expect("non-empty table");
                assert!(index < weights.len());
            }
        }
    }

    #[test]
    fn seeded_batches_replay_identically() {
        let table = SamplerTable::build(&[5.0, 1.0, 3.0], 3);
        let mut first = Rng::new(123);
        let mut second = Rng::new(123);
        assert_eq!(
            table.sample_many(500, &mut first),
            table.sample_many(500, &mut second)
        );
    }

    #[test]
    fn each_query_consumes_two_draws() {
        for strategy in STRATEGIES {
            let table = table(&[1.0, 2.0], strategy);
            let mut rng = Rng::new(9);
            let _ = table.sample_with(&mut rng);
            let mut reference = Rng::new(9);
            reference.next_f32();
            reference.next_f32();
            assert_eq!(rng.next_f32(), reference.next_f32());
        }
    }

    #[test]
    fn table_is_shared_across_reader_threads() {
        let table = SamplerTable::build(&[], 64);
        let batches: Vec<Vec<usize>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4u32)
                .map(|seed| {
                    let table = &table;
                    scope.spawn(move || table.sample_many(1_000, &mut Rng::new(seed)))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("reader thread panicked"))
                .collect()
        });
        for (seed, batch) in batches.iter().enumerate() {
            assert_eq!(batch, &table.sample_many(1_000, &mut Rng::new(seed as u32)));
        }
    }

    #[test]
    fn alias_query_follows_probability_then_alias() {
        // scaled = [0.5, 1.5]: slot 0 keeps half its mass, the rest aliases to 1.
        let table = table(&[1.0, 3.0], SamplerStrategy::Alias);
        assert_eq!(table.sample_one(0.1, 0.25), Some(0));
        assert_eq!(table.sample_one(0.1, 0.75), Some(1));
        assert_eq!(table.sample_one(0.9, 0.99), Some(1));
    }

    #[test]
    fn cumulative_query_uses_first_covering_range() {
        let table = table(&[1.0, 3.0], SamplerStrategy::Cumulative);
        assert_eq!(table.sample_one(0.0, 0.9), Some(0));
        assert_eq!(table.sample_one(0.2, 0.9), Some(0));
        assert_eq!(table.sample_one(0.3, 0.0), Some(1));
        assert_eq!(table.sample_one(0.99, 0.0), Some(1));
    }
}
