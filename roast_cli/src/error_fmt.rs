//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use roast_core::{BuildError, RoastError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingOracle => {
                "What happened: No prediction oracle was provided to the session builder.\nLikely causes: The surrogate model failed to construct or was not wired into the builder.\nHow to fix: Pass a model via .oracle(...) before calling build().".to_string()
            }
            BuildError::MissingProfile => {
                "What happened: No reference profile was set for a pid or neural run.\nLikely causes: --profile-csv pointed at a missing file, or the builder was not given a profile.\nHow to fix: Pass --profile default|random|ramp or a valid --profile-csv.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/roast_config.toml for a sample."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RoastError>() {
        return match re {
            RoastError::Oracle(msg) => format!(
                "What happened: The state prediction model failed ({msg}).\nLikely causes: Non-finite state values, usually from an unstable timestep or bad model output.\nHow to fix: Reduce simulation.timestep_s, or check the model if using a custom oracle."
            ),
            RoastError::Policy(msg) => format!(
                "What happened: The control policy failed ({msg}).\nLikely causes: mpc.input_dim does not match the configured horizon/history lengths.\nHow to fix: Set mpc.input_dim = 3*n_samples + 5 + 4*n_past_states, or let defaults apply."
            ),
            RoastError::Profile(msg) => format!(
                "What happened: The reference profile is invalid ({msg}).\nLikely causes: Fewer than two waypoints, duplicate times, or non-finite values in the CSV.\nHow to fix: Fix the waypoint list (strictly increasing minutes, finite temperatures)."
            ),
            RoastError::Config(msg) | RoastError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("profile csv must have headers") {
        return "Invalid headers in profile CSV. Expected 'minutes,celsius'.".to_string();
    }

    if lower.contains("parse config") || lower.contains("invalid config") {
        return "What happened: Configuration failed to parse or validate.\nLikely causes: Malformed TOML or out-of-range values ([simulation], [pid], [mpc], [fixed]).\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured JSON for errors when --json is enabled.
pub fn to_json(err: &eyre::Report) -> String {
    use roast_core::{BuildError, RoastError};
    use serde_json::json;

    let kind = if err.downcast_ref::<BuildError>().is_some() {
        "build"
    } else if let Some(re) = err.downcast_ref::<RoastError>() {
        match re {
            RoastError::Oracle(_) => "oracle",
            RoastError::Policy(_) => "policy",
            RoastError::Config(_) => "config",
            RoastError::Profile(_) => "profile",
            RoastError::State(_) => "state",
        }
    } else {
        "error"
    };
    json!({ "reason": kind, "message": humanize(err) }).to_string()
}
