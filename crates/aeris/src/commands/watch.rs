//! `watch` -- run the coordinator and stream sensor updates until
//! interrupted (or for a fixed number of ticks).

use chrono::Local;
use futures_util::StreamExt;
use owo_colors::OwoColorize;
use tracing::warn;

use aeris_core::{
    Coordinator, CoordinatorState, CoreError, FetchErrorKind, PollerConfig, RosterStream,
    SensorKind,
};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: WatchArgs,
    config: PollerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = config.refresh_interval;
    let coordinator = Coordinator::new(config)?;
    let color = output::should_color(&global.color);

    // Initial refresh so the first tick isn't one interval away. Auth
    // failures abort -- they won't fix themselves; anything transient
    // rides along on stale-data policy.
    match coordinator.refresh().await {
        Ok(_) => print_tick(&coordinator.current(), color, global.quiet),
        Err(err @ CoreError::Fetch {
            kind: FetchErrorKind::Auth,
            ..
        }) => return Err(err.into()),
        Err(err) => warn!(error = %err, "initial refresh failed -- retrying on the next tick"),
    }

    let mut roster = RosterStream::new(coordinator.registry()).into_stream();
    let mut state_rx = coordinator.subscribe();
    state_rx.borrow_and_update();

    coordinator.start().await;
    if !global.quiet {
        let service = coordinator.registry().service_info();
        println!(
            "{} -- polling every {}s, press Ctrl-C to stop",
            service.name,
            interval.as_secs()
        );
    }

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            Some(sensors) = roster.next() => {
                if !global.quiet {
                    println!("tracking {} sensors", sensors.len());
                }
            }

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                print_tick(&state, color, global.quiet);

                ticks += 1;
                if args.ticks > 0 && ticks >= args.ticks {
                    break;
                }
            }
        }
    }

    coordinator.stop().await;
    Ok(())
}

/// One line per applied tick: indexes on success, classification on
/// failure, degradation called out once it kicks in.
fn print_tick(state: &CoordinatorState, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    let stamp = Local::now().format("%H:%M:%S");

    if let Some(kind) = state.last_error {
        let note = format!(
            "{stamp}  refresh failed ({kind}) -- keeping last known data ({} in a row)",
            state.consecutive_failures
        );
        if state.is_degraded() && color {
            eprintln!("{}", note.red());
        } else {
            eprintln!("{note}");
        }
        return;
    }

    let Some(result) = state.last_result.as_ref() else {
        return;
    };

    let indexes: Vec<String> = result
        .iter()
        .filter(|(_, value)| value.kind == SensorKind::Index)
        .map(|(key, value)| format!("{key}={}", value.reading))
        .collect();

    println!(
        "{stamp}  {}  ({} metrics)",
        if indexes.is_empty() {
            "no index data".to_owned()
        } else {
            indexes.join("  ")
        },
        result.len()
    );
}
