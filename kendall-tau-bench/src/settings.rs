use foundations::settings::settings;
use kendall_tau_data::GeneratorSettings;

#[settings(impl_default = false)]
pub(crate) struct DataSettings {
    /// Directory holding x.npy and y.npy.
    pub(crate) directory: String,
    /// Number of samples to generate when generating data.
    pub(crate) sample_count: usize,
    /// Seed for data generation. The same seed always gives the same data.
    pub(crate) seed: u64,
    /// Standard deviation of the noise added to x to get y.
    pub(crate) noise_std_dev: f64,
}

impl DataSettings {
    pub(crate) fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            sample_count: self.sample_count,
            seed: self.seed,
            noise_std_dev: self.noise_std_dev,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        let generator = GeneratorSettings::default();
        Self {
            directory: "data".into(),
            sample_count: generator.sample_count,
            seed: generator.seed,
            noise_std_dev: generator.noise_std_dev,
        }
    }
}

#[settings(impl_default = false)]
pub(crate) struct SweepSettings {
    /// The smallest worker count to run the parallel engine with.
    pub(crate) min_workers: usize,
    /// The largest worker count to run the parallel engine with.
    /// This is capped at the number of logical cores.
    pub(crate) max_workers: usize,
    /// The time in milliseconds a single chunk may take before the run is aborted.
    /// 0 disables the timeout.
    pub(crate) chunk_timeout: u64,
}

impl SweepSettings {
    pub(crate) fn chunk_timeout(&self) -> Option<u128> {
        (self.chunk_timeout > 0).then_some(self.chunk_timeout as u128)
    }
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            min_workers: 2,
            max_workers: 8,
            chunk_timeout: 0,
        }
    }
}

#[settings(impl_default = false)]
pub(crate) struct OutputSettings {
    /// Where the result of the sequential run is written.
    pub(crate) sequential_results: String,
    /// Where the results of the worker count sweep are written.
    pub(crate) parallel_results: String,
    /// Log file, written in addition to stdout.
    pub(crate) log_file: String,
    /// Log debug messages as well, including every dispatched chunk.
    pub(crate) verbose: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sequential_results: "results_sequential.txt".into(),
            parallel_results: "results_parallel.txt".into(),
            log_file: "kendall-tau-bench.log".into(),
            verbose: false,
        }
    }
}

#[settings(impl_default = false)]
pub(crate) struct BenchSettings {
    /// Input data settings
    pub(crate) data: DataSettings,

    /// Worker count sweep settings
    pub(crate) sweep: SweepSettings,

    /// Result and log file settings
    pub(crate) output: OutputSettings,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            data: Default::default(),
            sweep: Default::default(),
            output: Default::default(),
        }
    }
}
