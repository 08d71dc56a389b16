//! Tap Dash headless runner
//!
//! Plays attract-mode runs against the simulation and prints each run
//! summary as JSON. Usage: `tap-dash [seed] [runs] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use tap_dash::consts::*;
    use tap_dash::sim::{FrameContext, GameEvent, GameState, step};
    use tap_dash::{Progress, Tuning};

    /// Stop a run that is still going after this many frames (10 minutes)
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    fn load_tuning(path: Option<&str>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::error!("Bad tuning file {}: {}", path, e);
                    Tuning::default()
                }
            },
            Err(e) => {
                log::error!("Failed to read {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let args: Vec<String> = std::env::args().skip(1).collect();
        let seed = args
            .first()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(rand::random);
        let runs = args
            .get(1)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        let tuning = load_tuning(args.get(2).map(String::as_str));

        log::info!("Tap Dash (headless) starting with seed {}", seed);

        let mut state = GameState::with_tuning(
            DEFAULT_VIEWPORT_WIDTH,
            DEFAULT_VIEWPORT_HEIGHT,
            seed,
            tuning,
        );
        let mut progress = Progress::default();
        let mut now = 0.0;

        for run in 0..runs {
            if run == 0 {
                state.start();
            } else {
                state.reset(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT);
            }

            while state.is_running() && state.stats.frames < MAX_FRAMES {
                now += REFERENCE_FRAME_MS;
                let ctx = FrameContext {
                    autopilot: true,
                    ..FrameContext::idle(now, REFERENCE_FRAME_MS)
                };
                for event in step(&mut state, &ctx) {
                    match event {
                        GameEvent::Score { .. } | GameEvent::CoinCollected { .. } => {
                            log::trace!("{:?}", event)
                        }
                        GameEvent::Jump | GameEvent::DoubleJump | GameEvent::SuperJump => {
                            log::debug!("{}", event.name())
                        }
                        _ => log::info!("{:?}", event),
                    }
                }
            }

            let summary = state.summary();
            let outcome = progress.record_run(&summary, now);
            if let Some(rank) = outcome.rank {
                log::info!("Run {} placed #{} on the leaderboard", run + 1, rank);
            }
            match serde_json::to_string(&summary) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Failed to serialize run summary: {}", e),
            }
        }

        log::info!(
            "Done: high score {} wallet {}",
            progress.high_score(),
            progress.wallet
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is driven by the host page; nothing to run here
}
