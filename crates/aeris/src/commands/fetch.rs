//! `fetch` -- one refresh cycle, rendered in the selected format.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::ProgressBar;
use serde::Serialize;
use tabled::Tabled;

use aeris_core::{Coordinator, MetricReading, PollerConfig, SensorKind};

use crate::cli::{FetchArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// One metric as rendered to the user (serde formats get the full record).
#[derive(Debug, Serialize)]
struct MetricEntry {
    key: String,
    name: String,
    kind: SensorKind,
    reading: MetricReading,
    unit: Option<String>,
    metadata: BTreeMap<String, String>,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "UNIT")]
    unit: String,
}

pub async fn handle(
    args: FetchArgs,
    config: PollerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let coordinator = Coordinator::new(config)?;

    let spinner = make_spinner(global);
    let outcome = coordinator.refresh().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    outcome?;

    let filter: Option<SensorKind> = args.kind.map(Into::into);
    let entries: Vec<MetricEntry> = coordinator
        .registry()
        .snapshot()
        .iter()
        .filter(|sensor| filter.is_none_or(|kind| sensor.descriptor().kind == kind))
        .map(|sensor| {
            let descriptor = sensor.descriptor();
            let state = sensor.state();
            MetricEntry {
                key: descriptor.key.clone(),
                name: descriptor.name.clone(),
                kind: descriptor.kind,
                reading: state.record.reading.clone(),
                unit: state.record.unit.clone(),
                metadata: state.record.metadata.clone(),
            }
        })
        .collect();

    let rendered = output::render_list(
        &global.output,
        &entries,
        |e| MetricRow {
            key: e.key.clone(),
            name: e.name.clone(),
            value: e.reading.to_string(),
            unit: e.unit.clone().unwrap_or_default(),
        },
        |e| format!("{}={}", e.key, e.reading),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Spinner while fetching, only for interactive table output.
fn make_spinner(global: &GlobalOpts) -> Option<ProgressBar> {
    let interactive = matches!(global.output, OutputFormat::Table)
        && !global.quiet
        && std::io::stderr().is_terminal();
    if !interactive {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_message("fetching current conditions...");
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}
