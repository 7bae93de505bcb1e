// src/exec/signal.rs

//! Best-effort termination of spawned commands.
//!
//! Every command leads its own process group, so a single `killpg` also
//! reaches whatever the command started (shell pipelines, build tool
//! workers, ...).

use std::io;

#[cfg(unix)]
fn to_pid(id: u32) -> io::Result<libc::pid_t> {
    libc::pid_t::try_from(id)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("pid {id} out of range")))
}

/// Send SIGTERM to the process group led by `pgid`.
#[cfg(unix)]
pub fn terminate_group(pgid: u32) -> io::Result<()> {
    let pgid = to_pid(pgid)?;
    // SAFETY: killpg only delivers a signal; it does not touch our memory.
    let rc = unsafe { libc::killpg(pgid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Whether any process is still a member of group `pgid`.
#[cfg(unix)]
pub fn group_alive(pgid: u32) -> bool {
    let Ok(pgid) = to_pid(pgid) else {
        return false;
    };
    // SAFETY: signal 0 performs the permission and existence checks only.
    let rc = unsafe { libc::killpg(pgid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub fn terminate_group(_pgid: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "process groups are not supported on this platform",
    ))
}

#[cfg(not(unix))]
pub fn group_alive(_pgid: u32) -> bool {
    false
}
