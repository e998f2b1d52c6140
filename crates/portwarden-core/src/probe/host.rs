//! Production [`SystemProbe`] backed by the host OS.
//!
//! Socket tables come from `/proc/net` on Linux with a socket-inode to pid
//! map built from `/proc/<pid>/fd`; other platforms contribute zero records.
//! Process names and liveness go through `sysinfo`; signals through `nix`.

use super::{ProbeError, RawSocket, SystemProbe};
#[cfg(target_os = "linux")]
use crate::inventory::types::{Protocol, SocketState};
use std::time::{Duration, Instant};

use sysinfo::{Pid as SysPid, System};
#[cfg(not(target_os = "linux"))]
use sysinfo::ProcessStatus;
use tracing::warn;

#[cfg(target_os = "linux")]
use std::collections::HashMap;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stateless; every call queries the OS fresh so a snapshot never sees stale
/// socket or process data.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl HostProbe {
    pub fn new() -> Self {
        Self
    }
}

impl SystemProbe for HostProbe {
    fn tcp_sockets(&self) -> Result<Vec<RawSocket>, ProbeError> {
        #[cfg(target_os = "linux")]
        {
            let owners = socket_owners();
            let mut sockets = Vec::new();
            for entry in procfs::net::tcp().map_err(map_proc_error)? {
                sockets.push(tcp_socket(&entry, &owners));
            }
            match procfs::net::tcp6() {
                Ok(entries) => {
                    for entry in entries {
                        sockets.push(tcp_socket(&entry, &owners));
                    }
                }
                // no tcp6 table on kernels without IPv6
                Err(procfs::ProcError::NotFound(_)) => {}
                Err(e) => return Err(map_proc_error(e)),
            }
            Ok(sockets)
        }
        #[cfg(not(target_os = "linux"))]
        {
            warn!("TCP socket enumeration is not implemented on this platform");
            Ok(Vec::new())
        }
    }

    fn udp_sockets(&self) -> Result<Vec<RawSocket>, ProbeError> {
        #[cfg(target_os = "linux")]
        {
            let owners = socket_owners();
            let mut sockets = Vec::new();
            for entry in procfs::net::udp().map_err(map_proc_error)? {
                sockets.push(udp_socket(&entry, &owners));
            }
            match procfs::net::udp6() {
                Ok(entries) => {
                    for entry in entries {
                        sockets.push(udp_socket(&entry, &owners));
                    }
                }
                Err(procfs::ProcError::NotFound(_)) => {}
                Err(e) => return Err(map_proc_error(e)),
            }
            Ok(sockets)
        }
        #[cfg(not(target_os = "linux"))]
        {
            warn!("UDP socket enumeration is not implemented on this platform");
            Ok(Vec::new())
        }
    }

    fn process_name(&self, pid: u32) -> Result<String, ProbeError> {
        let mut sys = System::new();
        sys.refresh_process(SysPid::from_u32(pid));
        match sys.process(SysPid::from_u32(pid)) {
            Some(process) => Ok(process.name().to_string()),
            None => Err(ProbeError::NotFound { pid }),
        }
    }

    fn signal_terminate(&self, pid: u32) -> Result<(), ProbeError> {
        #[cfg(unix)]
        {
            send_signal(pid, nix::sys::signal::Signal::SIGTERM)
        }
        #[cfg(not(unix))]
        {
            let _ = pid;
            Err(ProbeError::Unsupported("process signaling"))
        }
    }

    fn signal_kill(&self, pid: u32) -> Result<(), ProbeError> {
        #[cfg(unix)]
        {
            send_signal(pid, nix::sys::signal::Signal::SIGKILL)
        }
        #[cfg(not(unix))]
        {
            let _ = pid;
            Err(ProbeError::Unsupported("process signaling"))
        }
    }

    fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if !is_running(pid) {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(EXIT_POLL_INTERVAL);
        }
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: nix::sys::signal::Signal) -> Result<(), ProbeError> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), signal) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(ProbeError::NotFound { pid }),
        Err(Errno::EPERM) => Err(ProbeError::AccessDenied(format!(
            "{} to pid {pid}",
            signal.as_str()
        ))),
        Err(e) => Err(ProbeError::Io(format!(
            "{} to pid {pid}: {e}",
            signal.as_str()
        ))),
    }
}

/// A zombie counts as exited: the signal took effect and the port is free,
/// only the parent's reap is outstanding.
#[cfg(target_os = "linux")]
fn is_running(pid: u32) -> bool {
    match procfs::process::Process::new(pid as i32) {
        Ok(process) => match process.stat() {
            Ok(stat) => stat.state != 'Z' && stat.state != 'X',
            Err(_) => false,
        },
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
fn is_running(pid: u32) -> bool {
    let mut sys = System::new();
    if !sys.refresh_process(SysPid::from_u32(pid)) {
        return false;
    }
    match sys.process(SysPid::from_u32(pid)) {
        Some(process) => !matches!(
            process.status(),
            ProcessStatus::Zombie | ProcessStatus::Dead
        ),
        None => false,
    }
}

/// Map socket inodes to owning pids by walking `/proc/<pid>/fd`. Processes
/// we may not read are skipped; their sockets surface with `pid = None`.
#[cfg(target_os = "linux")]
fn socket_owners() -> HashMap<u64, u32> {
    let mut owners = HashMap::new();
    let processes = match procfs::process::all_processes() {
        Ok(iter) => iter,
        Err(e) => {
            warn!(error = %e, "cannot enumerate /proc; sockets will not be correlated");
            return owners;
        }
    };
    for process in processes.flatten() {
        let pid = process.pid() as u32;
        let fds = match process.fd() {
            Ok(fds) => fds,
            Err(_) => continue,
        };
        for fd in fds.flatten() {
            if let procfs::process::FDTarget::Socket(inode) = fd.target {
                owners.insert(inode, pid);
            }
        }
    }
    owners
}

#[cfg(target_os = "linux")]
fn tcp_socket(entry: &procfs::net::TcpNetEntry, owners: &HashMap<u64, u32>) -> RawSocket {
    RawSocket {
        protocol: Protocol::Tcp,
        state: map_tcp_state(&entry.state),
        local: entry.local_address,
        remote: connected_remote(entry.remote_address),
        pid: owners.get(&entry.inode).copied(),
    }
}

#[cfg(target_os = "linux")]
fn udp_socket(entry: &procfs::net::UdpNetEntry, owners: &HashMap<u64, u32>) -> RawSocket {
    RawSocket {
        protocol: Protocol::Udp,
        state: SocketState::None,
        local: entry.local_address,
        remote: connected_remote(entry.remote_address),
        pid: owners.get(&entry.inode).copied(),
    }
}

/// The kernel reports `0.0.0.0:0` for unconnected sockets; that is "no
/// remote", not an address.
#[cfg(target_os = "linux")]
fn connected_remote(addr: std::net::SocketAddr) -> Option<std::net::SocketAddr> {
    if addr.port() == 0 && addr.ip().is_unspecified() {
        None
    } else {
        Some(addr)
    }
}

/// Funnel a `/proc` read failure into the OS-boundary error type. No pid is
/// in scope here, so these surface as generic I/O failures.
#[cfg(target_os = "linux")]
fn map_proc_error(err: procfs::ProcError) -> ProbeError {
    ProbeError::Io(err.to_string())
}

#[cfg(target_os = "linux")]
fn map_tcp_state(state: &procfs::net::TcpState) -> SocketState {
    use procfs::net::TcpState as T;
    match state {
        T::Listen => SocketState::Listen,
        T::Established => SocketState::Established,
        T::TimeWait => SocketState::TimeWait,
        T::CloseWait => SocketState::CloseWait,
        T::FinWait1 => SocketState::FinWait1,
        T::FinWait2 => SocketState::FinWait2,
        T::SynSent => SocketState::SynSent,
        T::SynRecv | T::NewSynRecv => SocketState::SynRecv,
        T::LastAck => SocketState::LastAck,
        T::Closing => SocketState::Closing,
        // Close and anything the kernel grows later fall outside the vocabulary
        _ => SocketState::None,
    }
}
