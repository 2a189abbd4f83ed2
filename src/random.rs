/// Source of the dice rolls behind every randomized decision.
///
/// A single source is shared by every sprite and the power controller. `fastrand::Rng` is the
/// production implementation; seed it for reproducible runs.
pub trait RandomSource {
    /// A uniform integer in `[0, n)`. `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize;

    /// A uniform float in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Pick one element uniformly. `items` must not be empty.
    fn choose<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }
}

impl RandomSource for fastrand::Rng {
    fn below(&mut self, n: usize) -> usize {
        self.usize(..n)
    }

    fn unit(&mut self) -> f64 {
        self.f64()
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRandom;
