//! Plain-text renderings of engine output: fixed-width tables for humans,
//! CSV for everything else. Pure string building; no engine logic.

use anyhow::Context;
use portwarden_core::{AuditEntry, SocketRecord, SystemStats};
use std::path::Path;

pub fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

pub fn records_table(records: &[SocketRecord]) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:<7} {:<5} {:<12} {:<8} {:<20} {:<8} {:<24} {}\n",
        "PORT", "PROTO", "STATE", "PID", "PROCESS", "CRITICAL", "LOCAL", "REMOTE"
    ));
    for r in records {
        s.push_str(&format!(
            "{:<7} {:<5} {:<12} {:<8} {:<20} {:<8} {:<24} {}\n",
            r.port,
            r.protocol,
            r.state,
            opt_u32(r.pid),
            r.process_name.as_deref().unwrap_or("-"),
            if r.is_critical { "yes" } else { "-" },
            r.local_address,
            r.remote_address.as_deref().unwrap_or("-"),
        ));
    }
    s
}

pub fn records_csv(records: &[SocketRecord]) -> String {
    let mut s = String::from(
        "port,protocol,state,pid,process_name,local_address,remote_address,is_critical\n",
    );
    for r in records {
        s.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            r.port,
            r.protocol,
            r.state,
            opt_u32(r.pid),
            csv_escape(r.process_name.as_deref().unwrap_or("")),
            csv_escape(&r.local_address),
            csv_escape(r.remote_address.as_deref().unwrap_or("")),
            r.is_critical,
        ));
    }
    s
}

pub fn stats_table(stats: &SystemStats) -> String {
    format!(
        "tcp ports:               {}\n\
         udp ports:               {}\n\
         listening:               {}\n\
         established connections: {}\n\
         unique processes:        {}\n",
        stats.total_tcp_ports,
        stats.total_udp_ports,
        stats.listening_ports,
        stats.established_connections,
        stats.unique_processes,
    )
}

pub fn stats_csv(stats: &SystemStats) -> String {
    format!(
        "total_tcp_ports,total_udp_ports,listening_ports,established_connections,unique_processes\n\
         {},{},{},{},{}\n",
        stats.total_tcp_ports,
        stats.total_udp_ports,
        stats.listening_ports,
        stats.established_connections,
        stats.unique_processes,
    )
}

pub fn actions_table(entries: &[AuditEntry]) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:<20} {:<15} {:<8} {:<20} {:<6} {:<16} {}\n",
        "TIME", "ACTION", "PID", "PROCESS", "PORT", "RESULT", "USER"
    ));
    for e in entries {
        s.push_str(&format!(
            "{:<20} {:<15} {:<8} {:<20} {:<6} {:<16} {}\n",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.action,
            opt_u32(e.target_pid),
            e.target_process.as_deref().unwrap_or("-"),
            e.target_port.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
            e.result,
            e.user.as_deref().unwrap_or("-"),
        ));
    }
    s
}

pub fn actions_csv(entries: &[AuditEntry]) -> String {
    let mut s =
        String::from("timestamp,action,target_pid,target_process,target_port,result,user\n");
    for e in entries {
        s.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            e.timestamp.to_rfc3339(),
            e.action,
            opt_u32(e.target_pid),
            csv_escape(e.target_process.as_deref().unwrap_or("")),
            e.target_port.map(|p| p.to_string()).unwrap_or_default(),
            csv_escape(&e.result),
            csv_escape(e.user.as_deref().unwrap_or("")),
        ));
    }
    s
}

fn opt_u32(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
