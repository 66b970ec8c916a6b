use kendall_tau::{InvalidInput, KendallTauError, Samples};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Clone, Debug, Copy, PartialEq)]
pub struct GeneratorSettings {
    /// The number of samples in each sequence. Must be at least 2.
    pub sample_count: usize,
    /// Seed for the random number generator. The same seed always gives the same data.
    pub seed: u64,
    /// Standard deviation of the noise added to `x` to get `y`.
    /// Larger values give a weaker correlation.
    pub noise_std_dev: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            sample_count: 100_000,
            seed: 42,
            noise_std_dev: 0.5,
        }
    }
}

/// Generates two correlated sequences: `x` drawn from a standard normal distribution,
/// and `y = x + noise` with normally distributed noise.
pub fn generate(settings: &GeneratorSettings) -> Result<Samples, KendallTauError> {
    log::debug!(
        "Generating {} samples with seed {}",
        settings.sample_count,
        settings.seed
    );
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);

    let invalid_noise = |_| InvalidInput::InvalidNoise(settings.noise_std_dev);
    let standard = Normal::new(0.0, 1.0).map_err(invalid_noise)?;
    let noise = Normal::new(0.0, settings.noise_std_dev).map_err(invalid_noise)?;

    let x: Vec<f64> = (0..settings.sample_count)
        .map(|_| standard.sample(&mut rng))
        .collect();
    let y: Vec<f64> = x.iter().map(|value| value + noise.sample(&mut rng)).collect();

    Samples::new(x, y)
}
