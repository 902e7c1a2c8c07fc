pub trait WeightProvider {
    fn weights(&self) -> (&[f32], f64);
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeightSet {
    per_index: Vec<f32>,
    total: f64,
}

impl WeightSet {
    pub fn new(index_range: usize, raw: &[f32]) -> Self {
        let mut per_index = Vec::with_capacity(index_range);
        let mut total = 0.0f64;
        for i in 0..index_range {
            let weight = if raw.is_empty() {
                1.0
            } else {
                raw.get(i).map(|w| clamp_weight(*w)).unwrap_or(0.0)
            };
            total += weight as f64;
            per_index.push(weight);
        }
        Self { per_index, total }
    }

    pub fn from_weights(raw: &[f32]) -> Self {
        Self::new(raw.len(), raw)
    }

    pub fn len(&self) -> usize {
        self.per_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_index.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.per_index
    }

    pub fn is_degenerate(&self) -> bool {
        self.per_index.is_empty() || self.total <= 0.0
    }
}

impl WeightProvider for WeightSet {
    fn weights(&self) -> (&[f32], f64) {
        (&self.per_index, self.total)
    }
}

// NaN compares false against 0.0 and lands on zero with the negatives.
fn clamp_weight(value: f32) -> f32 {
    if value > 0.0 {
        value.min(f32::MAX)
    } else {
        0.0
    }
}
