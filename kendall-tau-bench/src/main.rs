use anyhow::Context;
use foundations::cli::{Arg, ArgAction, Cli};
use kendall_tau::{
    settings::available_workers, Engine, KendallTauError, SampleSource, SequentialEngine,
};
use kendall_tau_data::NpySource;

use settings::BenchSettings;

mod logging;
mod report;
mod settings;
mod sweep;

fn main() -> anyhow::Result<()> {
    // Obtain service information from Cargo.toml
    let service_info = foundations::service_info!();

    let cli = Cli::<BenchSettings>::new(
        &service_info,
        vec![
            Arg::new("generate-data")
                .long("generate-data")
                .action(ArgAction::SetTrue)
                .help("Generate new sample data before running"),
            Arg::new("sequential-only")
                .long("sequential-only")
                .action(ArgAction::SetTrue)
                .help("Only run the sequential engine"),
        ],
    )?;
    let settings = &cli.settings;

    logging::setup_logging(&settings.output.log_file, settings.output.verbose)?;

    let source = NpySource::new(&settings.data.directory);

    if cli.arg_matches.get_flag("generate-data") {
        log::info!("Generating test data...");
        let samples = kendall_tau_data::generate(&settings.data.generator_settings())?;
        source.save(&samples)?;
    }

    let samples = match source.load() {
        Ok(samples) => samples,
        Err(err @ KendallTauError::DataUnavailable { .. }) => {
            log::error!("{}", err);
            log::error!("Run again with --generate-data to create the data files.");
            return Err(err.into());
        }
        Err(err) => return Err(err).context("Could not load samples"),
    };

    log::info!(
        "Computing Kendall correlation for {} samples from {}...",
        samples.len(),
        source.describe()
    );

    let sequential = SequentialEngine::new().run(&samples)?;
    log::info!("Kendall correlation coefficient: {:.4}", sequential.tau);
    log::info!("Execution time: {:.2} seconds", sequential.elapsed_seconds());
    report::write_report(
        &settings.output.sequential_results,
        &report::sequential_report(&sequential),
    )?;

    if cli.arg_matches.get_flag("sequential-only") {
        return Ok(());
    }

    let worker_counts = sweep::worker_counts(&settings.sweep, available_workers());
    if worker_counts.is_empty() {
        log::warn!(
            "No worker counts to test: the sweep starts at {} but only {} cores are available",
            settings.sweep.min_workers,
            available_workers()
        );
        return Ok(());
    }
    log::info!(
        "Testing with {} to {} workers...",
        worker_counts.start(),
        worker_counts.end()
    );

    let results = sweep::run_sweep(&samples, worker_counts, settings.sweep.chunk_timeout())
        .context("Parallel run failed, the sequential result is still available")?;

    sweep::log_speedups(&sequential, &results);
    report::write_report(
        &settings.output.parallel_results,
        &report::parallel_report(samples.len(), &results),
    )?;

    Ok(())
}
