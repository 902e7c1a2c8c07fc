use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use weighted_index_sampler::constants::{DEFAULT_SIMULATION_COUNT, DEFAULT_TOLERANCE};
use weighted_index_sampler::report::{build_report, collect_anomalies};
use weighted_index_sampler::rng::{random_seed, Rng};
use weighted_index_sampler::sampler::{SamplerOptions, SamplerStrategy, SamplerTable};
use weighted_index_sampler::types::DistributionReport;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Comma separated weights, e.g. `1,2,0,4`. Omit for uniform weights.
    #[arg(long)]
    weights: Option<String>,
    #[arg(long)]
    index_range: Option<usize>,
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    strategy: Option<String>,
    #[arg(long)]
    tolerance: Option<f64>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    strategy: SamplerStrategy,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    #[serde(flatten)]
    report: DistributionReport,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "worstDeviation")]
    worst_deviation: f64,
    tolerance: f64,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let seed = cli.seed.map(normalize_seed).unwrap_or_else(random_seed);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, run_started_at_ms));
    let tolerance = cli.tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let count = cli.count.unwrap_or(DEFAULT_SIMULATION_COUNT);

    let Some(weights) = parse_weights(cli.weights.as_deref().unwrap_or("")) else {
        emit_log(
            "error",
            "invalid_weights",
            &run_id,
            None,
            None,
            json!({ "weights": cli.weights }),
        );
        std::process::exit(2);
    };
    let index_range = cli.index_range.unwrap_or(weights.len());

    let Some(scenarios) = resolve_scenarios(cli.strategy.as_deref(), seed) else {
        emit_log(
            "error",
            "invalid_strategy",
            &run_id,
            None,
            None,
            json!({ "strategy": cli.strategy }),
        );
        std::process::exit(2);
    };

    let mut scenario_results = Vec::new();
    let mut anomaly_count = 0usize;
    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            json!({
                "strategy": scenario.strategy,
                "indexRange": index_range,
                "count": count,
            }),
        );

        let result = run_scenario(&scenario, &weights, index_range, count, tolerance);
        for anomaly in &result.anomalies {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                json!({ "message": anomaly }),
            );
        }
        anomaly_count += result.anomalies.len();

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            json!({
                "strategy": result.report.strategy,
                "draws": result.report.draws,
                "maxDeviation": result.report.max_deviation,
                "anomalyCount": result.anomalies.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&result).expect("scenario result should serialize")
        );
        scenario_results.push(result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        tolerance,
        anomaly_count,
        scenario_results,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "worstDeviation": summary.worst_deviation,
            "summaryOut": summary_out_written,
        }),
    );

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_scenario(
    scenario: &Scenario,
    weights: &[f32],
    index_range: usize,
    count: usize,
    tolerance: f64,
) -> ScenarioResultLine {
    let table = SamplerTable::with_options(
        weights,
        index_range,
        SamplerOptions::with_strategy(scenario.strategy),
    );
    let mut stream = Rng::new(scenario.seed);
    let indices = table.sample_many(count, &mut stream);
    let report = build_report(&table, &indices, scenario.seed);
    let anomalies = collect_anomalies(&report, tolerance);
    ScenarioResultLine {
        scenario: scenario.name.clone(),
        report,
        anomalies,
    }
}

fn parse_weights(raw: &str) -> Option<Vec<f32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.parse::<f32>().ok())
        .collect()
}

fn resolve_scenarios(strategy: Option<&str>, seed: u32) -> Option<Vec<Scenario>> {
    if let Some(raw) = strategy {
        let strategy = SamplerStrategy::parse(raw.trim())?;
        return Some(vec![Scenario {
            name: format!("custom-{}", strategy_key(strategy)),
            strategy,
            seed,
        }]);
    }

    Some(vec![
        Scenario {
            name: "alias-check".to_string(),
            strategy: SamplerStrategy::Alias,
            seed,
        },
        Scenario {
            name: "cumulative-check".to_string(),
            strategy: SamplerStrategy::Cumulative,
            seed: seed.wrapping_add(1),
        },
    ])
}

fn strategy_key(strategy: SamplerStrategy) -> &'static str {
    match strategy {
        SamplerStrategy::Auto => "auto",
        SamplerStrategy::Alias => "alias",
        SamplerStrategy::Cumulative => "cumulative",
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    tolerance: f64,
    anomaly_count: usize,
    scenarios: Vec<ScenarioResultLine>,
) -> RunSummary {
    let worst_deviation = scenarios
        .iter()
        .map(|scenario| scenario.report.max_deviation)
        .fold(0.0, f64::max);
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count: scenarios.len(),
        anomaly_count,
        worst_deviation,
        tolerance,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
