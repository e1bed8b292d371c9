use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log lines are stored instead of
/// printed so they do not tear the alternate screen.
pub fn activate() {
    *lock() = Some(Vec::new());
}

/// Deactivate buffering and return all collected lines.
pub fn drain() -> Vec<String> {
    lock().take().unwrap_or_default()
}

pub fn is_active() -> bool {
    lock().is_some()
}

/// Store a line if buffering is active; otherwise print it to stderr.
pub fn emit(line: String) {
    let mut guard = lock();
    if let Some(buf) = guard.as_mut() {
        buf.push(line);
    } else {
        drop(guard);
        eprintln!("{}", line);
    }
}

/// Writer handed to the tracing subscriber. Collects one formatted event and
/// routes it through `emit` when dropped.
#[derive(Default)]
pub struct BufferedStderr {
    pending: Vec<u8>,
}

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        for line in text.lines().filter(|l| !l.is_empty()) {
            emit(line.to_string());
        }
        Ok(())
    }
}

impl Drop for BufferedStderr {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeBufferedStderr;

impl<'a> MakeWriter<'a> for MakeBufferedStderr {
    type Writer = BufferedStderr;

    fn make_writer(&'a self) -> Self::Writer {
        BufferedStderr::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the buffer is process-global
    #[test]
    fn test_buffer_lifecycle() {
        activate();
        assert!(is_active());

        {
            let mut writer = MakeBufferedStderr.make_writer();
            writer.write_all(b"first line\nsecond line\n").unwrap();
        }
        emit("direct".to_string());

        let lines = drain();
        assert!(!is_active());
        assert_eq!(lines, vec!["first line", "second line", "direct"]);
        assert!(drain().is_empty());
    }
}
