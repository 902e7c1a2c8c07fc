pub trait UniformSource {
    fn next_f32(&mut self) -> f32;
}

#[derive(Clone, Debug)]
pub struct Rng {
    initial_seed: u32,
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            initial_seed: seed,
            seed,
        }
    }

    pub fn initial_seed(&self) -> u32 {
        self.initial_seed
    }

    pub fn reset(&mut self) {
        self.seed = self.initial_seed;
    }

    pub fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    pub fn next_f32(&mut self) -> f32 {
        // 24 bits keep the result strictly below 1.0 after the f32 conversion.
        (self.next_u32() >> 8) as f32 / 16_777_216.0
    }
}

impl UniformSource for Rng {
    fn next_f32(&mut self) -> f32 {
        Rng::next_f32(self)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AmbientRng;

impl AmbientRng {
    pub fn new() -> Self {
        Self
    }
}

impl UniformSource for AmbientRng {
    fn next_f32(&mut self) -> f32 {
        rand::random::<f32>()
    }
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

pub fn random_seed() -> u32 {
    rand::random::<u32>()
}
