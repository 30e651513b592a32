use adb_bench_instruments::{
    rate_mib_per_s, ReportConfig, SampleSet, ScenarioResult, TransferRecord,
};
use adb_bench_summary_model::{append_run_summary, RunSummary, ScenarioSummary};
use anyhow::Context;

use crate::cli::ReporterOpt;
use crate::context::{RunnerContext, UserValuesConstraint};
use crate::definition::{
    BenchmarkDefinition, BenchmarkDefinitionBuilder, HookResult, TransferScenario,
};
use crate::progress::ScenarioProgress;
use crate::types::{BenchResult, TransferSize};

/// Run every selected scenario of the benchmark in order and report the results.
///
/// The first failing transfer stops the run and its error is returned. Scenario and global
/// teardown hooks still run before the error is returned.
pub fn run<RV: UserValuesConstraint>(
    definition: BenchmarkDefinitionBuilder<RV>,
) -> BenchResult<Vec<ScenarioResult>> {
    let definition = definition.build()?;

    log::info!(
        "Running benchmark: {} ({} runs of {} per scenario)",
        definition.name,
        definition.runs,
        definition.transfer_size
    );

    let run_id = nanoid::nanoid!();
    let started_at = chrono::Utc::now().timestamp();

    let mut reporter = match definition.reporter {
        ReporterOpt::Console => ReportConfig::default().enable_summary().init(),
        ReporterOpt::Noop => ReportConfig::default().init(),
    };
    let mut runner_context = RunnerContext::<RV>::new(
        definition.cli.clone(),
        definition.runs,
        definition.transfer_size,
    );

    if let Some(setup_fn) = definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    let mut results = Vec::with_capacity(definition.scenarios.len());
    let outcome = definition.scenarios.iter().try_for_each(|scenario| {
        let result = run_scenario(&mut runner_context, scenario, &definition)?;
        reporter.add_result(&result);
        results.push(result);
        Ok::<_, anyhow::Error>(())
    });

    if let Some(teardown_fn) = definition.teardown_fn {
        // Don't mask the outcome of the scenarios if the teardown fails. The hook is documented
        // as 'best effort'.
        if let Err(e) = teardown_fn(&mut runner_context) {
            log::error!("Teardown failed: {:?}", e);
        }
    }

    outcome?;

    reporter.finalize();

    if let Some(path) = &definition.summary_file {
        let summary = build_summary(run_id, started_at, &definition, &runner_context, &results);
        log::info!("Appending run summary with fingerprint {}", summary.fingerprint());
        append_run_summary(summary, path.clone())
            .with_context(|| format!("Failed to append run summary to {}", path.display()))?;
    }

    Ok(results)
}

fn run_scenario<RV: UserValuesConstraint>(
    runner_context: &mut RunnerContext<RV>,
    scenario: &TransferScenario<RV>,
    definition: &BenchmarkDefinition<RV>,
) -> BenchResult<ScenarioResult> {
    let size = definition.transfer_size;
    log::info!("Running scenario: {}", scenario.name());

    if let Some(setup_fn) = scenario.setup_fn() {
        setup_fn(runner_context, size)
            .with_context(|| format!("Setup failed for scenario '{}'", scenario.name()))?;
    }

    let progress = if definition.no_progress {
        ScenarioProgress::hidden()
    } else {
        ScenarioProgress::start(scenario.name(), definition.runs)
    };

    let transfer_fn = scenario.transfer_fn();
    let samples = measure_throughput(definition.runs, size, &progress, |size| {
        transfer_fn(runner_context, size)
    });
    progress.finish();

    if let Some(teardown_fn) = scenario.teardown_fn() {
        if let Err(e) = teardown_fn(runner_context, size) {
            log::warn!("Teardown failed for scenario '{}': {:?}", scenario.name(), e);
        }
    }

    let samples = samples
        .with_context(|| format!("Transfer failed for scenario '{}'", scenario.name()))?;
    let stats = samples
        .stats()
        .with_context(|| format!("Cannot summarise scenario '{}'", scenario.name()))?;

    Ok(ScenarioResult::new(
        scenario.label(size),
        size.mib(),
        stats,
        samples.into_inner(),
    ))
}

/// Time `runs` calls of `transfer`, in sequence, and return the rate of each in MiB/s.
///
/// The first error from `transfer` is returned immediately, without retrying.
pub fn measure_throughput<F>(
    runs: usize,
    size: TransferSize,
    progress: &ScenarioProgress,
    mut transfer: F,
) -> BenchResult<SampleSet>
where
    F: FnMut(TransferSize) -> HookResult,
{
    let mut samples = SampleSet::with_capacity(runs);

    for run in 1..=runs {
        let mut record = TransferRecord::start();
        transfer(size)?;
        let elapsed = record.finish();

        let rate = rate_mib_per_s(size.mib(), elapsed);
        log::debug!(
            "Run {run}/{runs}: {size} in {:.3}s, {rate:.2} MiB/s",
            elapsed.as_secs_f64()
        );
        samples.push(rate);
        progress.inc();
    }

    Ok(samples)
}

fn build_summary<RV: UserValuesConstraint>(
    run_id: String,
    started_at: i64,
    definition: &BenchmarkDefinition<RV>,
    runner_context: &RunnerContext<RV>,
    results: &[ScenarioResult],
) -> RunSummary {
    let mut summary = RunSummary::new(
        run_id,
        definition.name.clone(),
        started_at,
        runner_context.target_id().unwrap_or_default().to_string(),
        definition.runs,
        definition.transfer_size.mib(),
        env!("CARGO_PKG_VERSION").to_string(),
    );

    for (scenario, result) in definition.scenarios.iter().zip(results) {
        summary.add_scenario(ScenarioSummary {
            name: scenario.name().to_string(),
            median: result.stats.median,
            harmonic_mean: result.stats.harmonic_mean,
            stddev: result.stats.stddev,
            samples: result.samples.clone(),
        });
    }

    for (key, value) in runner_context.captured_env() {
        summary.add_env(key.clone(), value.clone());
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn measure_calls_transfer_once_per_run() {
        let mut calls = Vec::new();

        let samples = measure_throughput(
            4,
            TransferSize::from_mib(2),
            &ScenarioProgress::hidden(),
            |size| {
                calls.push(size);
                std::thread::sleep(Duration::from_millis(1));
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(calls, vec![TransferSize::from_mib(2); 4]);
        assert_eq!(samples.len(), 4);
        assert!(samples.as_slice().iter().all(|rate| *rate > 0.0));
    }

    #[test]
    fn measure_stops_at_first_failure() {
        let mut calls = 0;

        let result = measure_throughput(
            10,
            TransferSize::from_mib(1),
            &ScenarioProgress::hidden(),
            |_| {
                calls += 1;
                if calls == 3 {
                    anyhow::bail!("device went away");
                }
                Ok(())
            },
        );

        assert_eq!(calls, 3);
        assert_eq!(result.unwrap_err().to_string(), "device went away");
    }

    #[test]
    fn slower_transfers_have_lower_rates() {
        let mut delay = 0;

        let samples = measure_throughput(
            2,
            TransferSize::from_mib(1),
            &ScenarioProgress::hidden(),
            |_| {
                delay += 20;
                std::thread::sleep(Duration::from_millis(delay));
                Ok(())
            },
        )
        .unwrap();

        let rates = samples.as_slice();
        assert!(rates[0] > rates[1]);
    }
}
