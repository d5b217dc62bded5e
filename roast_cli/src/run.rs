//! Command implementations: session assembly and roast execution.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;

use roast_core::runner::{RoastOutcome, RunParams, run_roast};
use roast_core::{
    Controller, ControlInputs, FixedParams, MpcParams, NeuralController, PidController,
    ReferenceProfile, RoastSession, Waypoint,
};
use roast_model::{HeuristicPolicy, SurrogateOracle};
use roast_traits::PolicyNetwork;

use crate::cli::{ControllerMode, ProfileKind};

pub struct RunArgs {
    pub mode: ControllerMode,
    pub duration_min: f64,
    pub heater: f64,
    pub fan: f64,
    pub mass_g: f64,
    pub profile: ProfileKind,
    pub profile_csv: Option<PathBuf>,
    pub seed: u64,
    pub speedup: Option<f64>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

fn build_profile(
    kind: ProfileKind,
    csv: Option<&PathBuf>,
    seed: u64,
    total_min: f64,
    start_c: f64,
    end_c: f64,
) -> eyre::Result<ReferenceProfile> {
    if let Some(path) = csv {
        let rows = roast_config::load_profile_csv(path)?;
        let waypoints = rows
            .iter()
            .map(|r| Waypoint {
                time_min: r.minutes,
                temp_c: r.celsius,
            })
            .collect();
        return ReferenceProfile::new(waypoints);
    }
    match kind {
        ProfileKind::Default => Ok(ReferenceProfile::default_roast()),
        ProfileKind::Random => ReferenceProfile::randomized(seed, total_min),
        ProfileKind::Ramp => ReferenceProfile::linear_ramp(start_c, end_c, total_min),
    }
}

pub fn run_roast_cmd(cfg: &roast_config::Config, args: RunArgs) -> eyre::Result<()> {
    if !(0.0..=1.0).contains(&args.heater) || !(0.0..=1.0).contains(&args.fan) {
        eyre::bail!("--heater and --fan must be in [0, 1]");
    }
    if args.mass_g < 0.0 {
        eyre::bail!("--mass-g must be >= 0");
    }
    if !(args.duration_min > 0.0) {
        eyre::bail!("--duration-min must be > 0");
    }

    let profile = build_profile(
        args.profile,
        args.profile_csv.as_ref(),
        args.seed,
        args.duration_min,
        24.0,
        203.0,
    )?;

    let controller = match args.mode {
        ControllerMode::Manual => Controller::Manual,
        ControllerMode::Pid => Controller::Pid(PidController::from(&cfg.pid)),
        ControllerMode::Neural => {
            let params = MpcParams::from(&cfg.mpc);
            let policy: Box<dyn PolicyNetwork> =
                Box::new(HeuristicPolicy::new(cfg.mpc.input_dim, cfg.mpc.n_samples));
            Controller::Neural(NeuralController::new(
                params,
                cfg.simulation.timestep_s,
                policy,
            )?)
        }
    };

    let mut session = RoastSession::builder()
        .oracle(SurrogateOracle::new())
        .simulation(&cfg.simulation)
        .fixed(FixedParams::from(&cfg.fixed))
        .manual(ControlInputs {
            heater: args.heater,
            fan: args.fan,
            mass_g: args.mass_g,
        })
        .profile(profile)
        .controller(controller)
        .build()?;

    // Ctrl-C requests an early drop; the runner finishes the grace tick.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install SIGINT handler");
        }
    }

    let params = RunParams {
        duration_min: args.duration_min,
        speedup: args.speedup.unwrap_or(cfg.simulation.speedup),
    };
    let outcome = run_roast(&mut session, &params, shutdown)?;

    emit_history(&session, args.output.as_ref(), args.json)?;
    report_outcome(&outcome, args.json);
    Ok(())
}

fn emit_history<O: roast_traits::PredictionOracle>(
    session: &RoastSession<O>,
    output: Option<&PathBuf>,
    json: bool,
) -> eyre::Result<()> {
    let samples = session.history().samples();
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .wrap_err_with(|| format!("create output file {path:?}"))?;
            let mut w = std::io::BufWriter::new(file);
            for s in samples {
                serde_json::to_writer(&mut w, s)?;
                writeln!(w)?;
            }
            w.flush()?;
            tracing::info!(rows = samples.len(), path = ?path, "history written");
        }
        None if json => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            for s in samples {
                serde_json::to_writer(&mut w, s)?;
                writeln!(w)?;
            }
        }
        None => {}
    }
    Ok(())
}

fn report_outcome(outcome: &RoastOutcome, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "final_bean_probe_c": outcome.final_bean_probe_c,
                "sim_minutes": outcome.sim_minutes,
                "ticks": outcome.ticks,
            })
        );
    } else {
        println!(
            "Roast complete: {:.1} °C bean probe after {:.2} min ({} ticks)",
            outcome.final_bean_probe_c, outcome.sim_minutes, outcome.ticks
        );
    }
}

pub fn profile_cmd(
    kind: ProfileKind,
    seed: u64,
    total_min: f64,
    start_c: f64,
    end_c: f64,
    json: bool,
) -> eyre::Result<()> {
    let profile = build_profile(kind, None, seed, total_min, start_c, end_c)?;
    let summary = profile.summary();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "waypoints": profile.waypoints(),
                "summary": summary,
            })
        );
    } else {
        println!("minutes,celsius");
        for w in profile.waypoints() {
            println!("{:.3},{:.2}", w.time_min, w.temp_c);
        }
        println!(
            "# duration {:.2} min, final {:.1} °C, max RoR {:.1} °C/min",
            summary.duration_min, summary.final_temp_c, summary.max_ror_c_per_min
        );
    }
    Ok(())
}

pub fn self_check(cfg: &roast_config::Config, json: bool) -> eyre::Result<()> {
    // One capacity lookup and one oracle step from the preheat state.
    use roast_traits::PredictionOracle;
    let mut oracle = SurrogateOracle::new();
    let state = roast_core::StateVector::preheat(cfg.simulation.preheat_temp_c);
    let capacity = oracle
        .bean_thermal_capacity(state.t_b)
        .map_err(|e| eyre::eyre!("capacity model: {e}"))?;
    let controls = roast_core::assemble_controls(
        0.5,
        0.5,
        &FixedParams::from(&cfg.fixed),
        100.0,
        capacity,
    );
    let next = oracle
        .step_state(
            &state.to_array(),
            &controls,
            cfg.simulation.timestep_s / roast_core::SECS_PER_MIN,
        )
        .map_err(|e| eyre::eyre!("state model: {e}"))?;
    if next.iter().any(|v| !v.is_finite()) {
        eyre::bail!("state model produced non-finite output");
    }

    // Policy wiring: construction fails fast on any input_dim mismatch.
    let policy: Box<dyn PolicyNetwork> =
        Box::new(HeuristicPolicy::new(cfg.mpc.input_dim, cfg.mpc.n_samples));
    let _ = NeuralController::new(
        MpcParams::from(&cfg.mpc),
        cfg.simulation.timestep_s,
        policy,
    )?;

    if json {
        println!("{}", serde_json::json!({ "self_check": "ok" }));
    } else {
        println!("self-check OK");
    }
    Ok(())
}
