use std::{fs, path::Path};

use anyhow::Context;
use kendall_tau::{RunResult, Strategy};

/// The sequential result file: header, sample count, tau and time.
pub(crate) fn sequential_report(result: &RunResult) -> String {
    let mut report = String::new();
    report.push_str("Sequential Implementation Results\n");
    report.push_str(&format!("Number of samples: {}\n", result.sample_count));
    push_measurements(&mut report, result);
    report
}

/// The parallel result file: header and sample count, then one block per worker count.
pub(crate) fn parallel_report(sample_count: usize, results: &[RunResult]) -> String {
    let mut report = String::new();
    report.push_str("Parallel Implementation Results\n");
    report.push_str(&format!("Number of samples: {}\n", sample_count));
    for result in results {
        let workers = match result.strategy {
            Strategy::Parallel { workers } => workers,
            Strategy::Sequential => 1,
        };
        report.push_str(&format!("\nProcesses: {}\n", workers));
        push_measurements(&mut report, result);
    }
    report
}

fn push_measurements(report: &mut String, result: &RunResult) {
    report.push_str(&format!(
        "Kendall correlation coefficient: {:.4}\n",
        result.tau
    ));
    report.push_str(&format!(
        "Execution time: {:.2} seconds\n",
        result.elapsed_seconds()
    ));
}

pub(crate) fn write_report(path: &str, report: &str) -> anyhow::Result<()> {
    fs::write(Path::new(path), report)
        .with_context(|| format!("Could not write results to {}", path))?;
    log::info!("Results written to {}", path);
    Ok(())
}
