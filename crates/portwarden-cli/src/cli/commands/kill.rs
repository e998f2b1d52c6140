use crate::cli::args::KillArgs;
use crate::exit_codes::{KILL_FAILED, SUCCESS};
use crate::render;
use portwarden_core::{
    CriticalPolicy, HostProbe, ProcessTerminator, TerminatorConfig,
};
use std::sync::Arc;

pub fn run(args: KillArgs) -> anyhow::Result<i32> {
    let config = TerminatorConfig {
        grace: humantime::parse_duration(&args.grace)?,
        kill_grace: humantime::parse_duration(&args.kill_grace)?,
    };
    let terminator = ProcessTerminator::new(
        Arc::new(HostProbe::new()),
        Arc::new(CriticalPolicy::builtin()),
        config,
    );

    let mut failed = false;
    for pid in &args.pids {
        let outcome = terminator.terminate(*pid, args.force, args.port);
        if outcome.success {
            println!("✓ {}", outcome.message);
        } else {
            failed = true;
            eprintln!("✗ {}", outcome.message);
        }
    }

    // the invocation's audit trail is the operator's receipt
    let actions = terminator.recent_actions(args.pids.len());
    let rendered = match args.out.format.as_str() {
        "table" => render::actions_table(&actions),
        "json" => serde_json::to_string_pretty(&actions)?,
        "yaml" => serde_yaml::to_string(&actions)?,
        "csv" => render::actions_csv(&actions),
        other => anyhow::bail!("unknown --format: {other}"),
    };
    render::emit(&rendered, args.out.output.as_deref())?;

    Ok(if failed { KILL_FAILED } else { SUCCESS })
}
