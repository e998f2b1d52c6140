use crate::cli::args::InspectArgs;
use crate::exit_codes::{INTERNAL_ERROR, SUCCESS};
use portwarden_core::{
    CriticalPolicy, HostProbe, ProbeError, ProcessTerminator, TerminatorConfig,
};
use std::sync::Arc;

pub fn run(args: InspectArgs) -> anyhow::Result<i32> {
    let terminator = ProcessTerminator::new(
        Arc::new(HostProbe::new()),
        Arc::new(CriticalPolicy::builtin()),
        TerminatorConfig::default(),
    );

    match terminator.process_info(args.pid) {
        Ok(details) => {
            println!("{} {}", details.pid, details.name);
            Ok(SUCCESS)
        }
        Err(ProbeError::NotFound { pid }) => {
            eprintln!("✗ no process with PID {pid}");
            Ok(INTERNAL_ERROR)
        }
        Err(e) => {
            eprintln!("✗ cannot inspect PID {}: {e}", args.pid);
            Ok(INTERNAL_ERROR)
        }
    }
}
