use super::{ProcessTerminator, TerminatorConfig};
use crate::audit::AuditAction;
use crate::policy::CriticalPolicy;
use crate::probe::mock::{MockProbe, MockProcess, SentSignal};
use std::sync::Arc;

const SELF_PID: u32 = 900_000;

fn terminator(probe: Arc<MockProbe>) -> ProcessTerminator<MockProbe> {
    ProcessTerminator::new(
        probe,
        Arc::new(CriticalPolicy::builtin()),
        TerminatorConfig::default(),
    )
    .with_self_pid(SELF_PID)
}

#[test]
fn graceful_termination_succeeds_and_audits_once() {
    let probe = Arc::new(MockProbe::new().with_process(1234, MockProcess::named("node")));
    let term = terminator(probe.clone());

    let outcome = term.terminate(1234, false, Some(3000));

    assert!(outcome.success);
    assert_eq!(outcome.pid, 1234);
    assert_eq!(outcome.process_name.as_deref(), Some("node"));
    assert!(outcome.message.contains("Successfully terminated"));
    assert_eq!(probe.sent_signals(), vec![(1234, SentSignal::Term)]);

    let log = term.recent_actions(10);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::Terminate);
    assert_eq!(log[0].result, "SUCCESS");
    assert_eq!(log[0].target_pid, Some(1234));
    assert_eq!(log[0].target_port, Some(3000));
}

#[test]
fn stubborn_process_gets_escalated_to_sigkill() {
    let mut process = MockProcess::named("stubborn");
    process.ignores_term = true;
    let probe = Arc::new(MockProbe::new().with_process(1234, process));
    let term = terminator(probe.clone());

    let outcome = term.terminate(1234, false, None);

    assert!(outcome.success);
    // graceful first, then the forced signal, in that order
    assert_eq!(
        probe.sent_signals(),
        vec![(1234, SentSignal::Term), (1234, SentSignal::Kill)]
    );

    // escalation still logs once, under the original action label
    let log = term.recent_actions(10);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::Terminate);
    assert_eq!(log[0].result, "SUCCESS");
}

#[test]
fn graceful_attempt_times_out_after_failed_escalation() {
    let mut process = MockProcess::named("immortal");
    process.ignores_term = true;
    process.unkillable = true;
    let probe = Arc::new(MockProbe::new().with_process(1234, process));
    let term = terminator(probe.clone());

    let outcome = term.terminate(1234, false, None);

    assert!(!outcome.success);
    assert!(outcome.message.contains("did not terminate"));
    assert_eq!(probe.sent_signals().len(), 2);

    let log = term.recent_actions(10);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::Terminate);
    assert_eq!(log[0].result, "TIMEOUT");
}

#[test]
fn force_sends_sigkill_immediately() {
    let probe = Arc::new(MockProbe::new().with_process(1234, MockProcess::named("node")));
    let term = terminator(probe.clone());

    let outcome = term.terminate(1234, true, None);

    assert!(outcome.success);
    assert_eq!(probe.sent_signals(), vec![(1234, SentSignal::Kill)]);
    assert_eq!(term.recent_actions(10)[0].action, AuditAction::ForceKill);
}

#[test]
fn forced_attempt_does_not_escalate_further_on_timeout() {
    let mut process = MockProcess::named("immortal");
    process.unkillable = true;
    let probe = Arc::new(MockProbe::new().with_process(1234, process));
    let term = terminator(probe.clone());

    let outcome = term.terminate(1234, true, None);

    assert!(!outcome.success);
    // exactly one SIGKILL; no second signal exists to escalate to
    assert_eq!(probe.sent_signals(), vec![(1234, SentSignal::Kill)]);

    let log = term.recent_actions(10);
    assert_eq!(log[0].action, AuditAction::ForceKill);
    assert_eq!(log[0].result, "TIMEOUT");
}

#[test]
fn critical_process_is_refused_and_never_signaled() {
    let probe = Arc::new(MockProbe::new().with_process(1, MockProcess::named("systemd")));
    let term = terminator(probe.clone());

    for force in [false, true] {
        let outcome = term.terminate(1, force, None);
        assert!(!outcome.success);
        assert!(outcome.message.contains("critical system process"));
        assert_eq!(outcome.process_name.as_deref(), Some("systemd"));
    }
    assert!(probe.sent_signals().is_empty());

    let log = term.recent_actions(10);
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].action, AuditAction::KillBlocked);
    assert_eq!(log[0].result, "CRITICAL_PROCESS");
}

#[test]
fn critical_name_matches_case_insensitively_in_the_guard() {
    let probe = Arc::new(MockProbe::new().with_process(2, MockProcess::named("SvcHost.exe")));
    let term = terminator(probe.clone());

    let outcome = term.terminate(2, true, None);
    assert!(!outcome.success);
    assert!(probe.sent_signals().is_empty());
}

#[test]
fn self_termination_is_refused_and_never_signaled() {
    let probe = Arc::new(
        MockProbe::new().with_process(SELF_PID, MockProcess::named("portwarden")),
    );
    let term = terminator(probe.clone());

    for force in [false, true] {
        let outcome = term.terminate(SELF_PID, force, None);
        assert!(!outcome.success);
        assert!(outcome.message.contains("portwarden process itself"));
    }
    assert!(probe.sent_signals().is_empty());
    assert_eq!(term.recent_actions(1)[0].result, "SELF_TERMINATION");
    assert_eq!(term.recent_actions(1)[0].action, AuditAction::KillBlocked);
}

#[test]
fn missing_process_reports_not_found_with_one_audit_entry() {
    let probe = Arc::new(MockProbe::new());
    let term = terminator(probe.clone());

    let outcome = term.terminate(4242, false, None);

    assert!(!outcome.success);
    assert!(outcome.message.contains("no longer exists"));
    assert_eq!(outcome.process_name, None);
    assert!(probe.sent_signals().is_empty());

    let log = term.recent_actions(10);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::KillAttempted);
    assert_eq!(log[0].result, "NOT_FOUND");
}

#[test]
fn denied_signal_reports_access_denied() {
    let mut process = MockProcess::named("rootd");
    process.signal_denied = true;
    let probe = Arc::new(MockProbe::new().with_process(77, process));
    let term = terminator(probe.clone());

    let outcome = term.terminate(77, false, None);

    assert!(!outcome.success);
    assert!(outcome.message.contains("Access denied"));
    assert!(outcome.message.contains("elevated privileges"));

    let log = term.recent_actions(10);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::KillAttempted);
    assert_eq!(log[0].result, "ACCESS_DENIED");
}

#[test]
fn process_info_resolves_live_processes() {
    let probe = Arc::new(MockProbe::new().with_process(1234, MockProcess::named("node")));
    let term = terminator(probe);

    let details = term.process_info(1234).unwrap();
    assert_eq!(details.pid, 1234);
    assert_eq!(details.name, "node");

    assert!(term.process_info(4242).is_err());
    // lookups are read-only: nothing lands in the audit trail
    assert!(term.recent_actions(10).is_empty());
}

#[test]
fn outcomes_carry_timestamps_and_serialize() {
    let probe = Arc::new(MockProbe::new().with_process(1234, MockProcess::named("node")));
    let term = terminator(probe);

    let outcome = term.terminate(1234, false, None);
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["pid"], 1234);
    assert!(json["timestamp"].is_string());
}
