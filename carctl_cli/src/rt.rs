//! Real-time scheduling helpers (Linux SCHED_FIFO / mlockall).

use crate::cli::RtLock;

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>, lock: RtLock) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    fn is_retryable_memlock_error(err: &std::io::Error) -> bool {
        matches!(err.raw_os_error(), Some(code) if code == libc::EPERM || code == libc::ENOMEM)
    }

    fn mlockall(flags: libc::c_int) -> std::io::Result<()> {
        let rc = unsafe { libc::mlockall(flags) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

    fn try_apply_mem_lock(lock: RtLock) -> eyre::Result<()> {
        let result = match lock {
            RtLock::None => return Ok(()),
            RtLock::Current => mlockall(libc::MCL_CURRENT),
            RtLock::All => mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE),
        };
        let Err(err) = result else {
            return Ok(());
        };
        // All -> Current when the limit is too small for future pages
        if lock == RtLock::All && is_retryable_memlock_error(&err) && mlockall(libc::MCL_CURRENT).is_ok() {
            return Ok(());
        }
        let mut msg = format!("mlockall failed: {err}");
        if is_retryable_memlock_error(&err) {
            msg.push_str("; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'");
        }
        Err(eyre::eyre!(msg))
    }

    fn try_apply_fifo_priority(prio: Option<i32>) -> eyre::Result<()> {
        let (min, max) = unsafe {
            let min = libc::sched_get_priority_min(libc::SCHED_FIFO);
            let max = libc::sched_get_priority_max(libc::SCHED_FIFO);
            if min < 0 || max < 0 { (1, 99) } else { (min, max) }
        };
        let param = libc::sched_param {
            sched_priority: prio.unwrap_or(max).clamp(min, max),
        };
        let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EPERM) {
                eyre::bail!("{err}; hint: run as root or grant CAP_SYS_NICE to the carctl binary");
            }
            return Err(eyre::eyre!(err));
        }
        Ok(())
    }

    RT_ONCE.get_or_init(|| {
        match try_apply_mem_lock(lock) {
            Ok(()) => tracing::info!(mode = ?lock, "RT: memory lock applied"),
            Err(err) => tracing::warn!(error = %err, "RT: memory lock not applied"),
        }
        match try_apply_fifo_priority(prio) {
            Ok(()) => tracing::info!(prio = ?prio, "RT: SCHED_FIFO enabled"),
            Err(err) => tracing::warn!(error = %err, prio = ?prio, "RT: sched_setscheduler(SCHED_FIFO) failed"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, _lock: RtLock) {
    if rt {
        tracing::warn!("RT: real-time mode is only supported on Linux; ignoring --rt");
    }
}
