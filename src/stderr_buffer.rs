use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

// A panic while holding the lock leaves plain data behind, so keep using it
fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|e| e.into_inner())
}

/// Activate buffering. While the quiz owns the terminal, `warn()` calls
/// store messages instead of printing to stderr.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Convenience macro that works like `eprintln!` but routes through the
/// stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the buffer is process-global
    #[test]
    fn test_buffering_cycle() {
        activate();
        warn("first".to_string());
        crate::buffered_eprintln!("second {}", 2);
        assert_eq!(drain(), vec!["first".to_string(), "second 2".to_string()]);
        assert!(drain().is_empty());
    }
}
