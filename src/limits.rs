//! Open file descriptor ceiling.

use crate::error::PipelineError;

/// Descriptors reserved on top of one socket per concurrent test.
pub const FD_HEADROOM: u64 = 64;

/// Make sure the process may hold at least `required` open descriptors.
///
/// Returns the soft limit in effect afterwards. The soft limit is lifted to
/// the hard limit when needed; a hard limit below `required` is an error.
#[cfg(unix)]
pub fn raise_fd_limit(required: u64) -> Result<u64, PipelineError> {
    use log::{debug, info};
    use std::io;

    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, writable rlimit for the duration of the call.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        return Err(PipelineError::ResourceLimit(
            io::Error::last_os_error().to_string(),
        ));
    }

    let current = limit.rlim_cur as u64;
    let hard = limit.rlim_max as u64;
    if limit.rlim_cur == libc::RLIM_INFINITY || current >= required {
        debug!("open file limit {} already covers {}", current, required);
        return Ok(current);
    }
    if limit.rlim_max != libc::RLIM_INFINITY && hard < required {
        return Err(PipelineError::ResourceLimit(format!(
            "need {} open files but the hard limit is {}",
            required, hard
        )));
    }

    let target = if limit.rlim_max == libc::RLIM_INFINITY {
        required
    } else {
        hard
    };
    let raised = libc::rlimit {
        rlim_cur: target as libc::rlim_t,
        rlim_max: limit.rlim_max,
    };
    // SAFETY: `raised` is a fully initialised rlimit.
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &raised) } != 0 {
        return Err(PipelineError::ResourceLimit(format!(
            "setrlimit to {} failed: {}",
            target,
            io::Error::last_os_error()
        )));
    }

    info!("Raised open file limit from {} to {}", current, target);
    Ok(target)
}

#[cfg(not(unix))]
pub fn raise_fd_limit(required: u64) -> Result<u64, PipelineError> {
    log::debug!("no open file limit to raise on this platform");
    Ok(required)
}
