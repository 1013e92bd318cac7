//! The run log: a file under `$XDG_CACHE_HOME/mycli/` that is only
//! created once the installer has decided to act.
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default location of the log for `command`, without touching the disk.
///
/// `$XDG_CACHE_HOME/mycli/<command>.log`, falling back to
/// `~/.cache/mycli/<command>.log`. `None` when neither variable is set.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let set = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty());
    let cache = set("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| set("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    Some(cache.join("mycli").join(format!("{command}.log")))
}

/// Current UTC time as `HH:MM:SS`, the per-line timestamp.
pub(super) fn timestamp() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}

#[derive(Debug)]
enum State {
    /// Not opened yet; lines are held until [`LogFile::open`].
    Pending(Vec<String>),
    Open(fs::File),
    /// Opening failed; lines are dropped.
    Unavailable,
}

/// Append-only log file that buffers lines until it is opened.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    state: Mutex<State>,
}

impl LogFile {
    /// A log at `path`. Nothing is created until [`open`](Self::open).
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(State::Pending(Vec::new())),
        }
    }

    /// Where the log lives (or will live).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether [`open`](Self::open) has succeeded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state
            .lock()
            .is_ok_and(|state| matches!(*state, State::Open(_)))
    }

    /// Append one line, or hold it while the file is still pending.
    pub fn append(&self, line: String) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match &mut *state {
            State::Pending(lines) => lines.push(line),
            State::Open(file) => {
                writeln!(file, "{line}").ok();
            }
            State::Unavailable => {}
        }
    }

    /// Create the file (and its directory), write a run header, and flush
    /// everything held so far. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory or file cannot be created.
    /// The log then stays unavailable for the rest of the run.
    pub fn open(&self, header: &str) -> io::Result<()> {
        let Ok(mut state) = self.state.lock() else {
            return Ok(());
        };
        let State::Pending(held) = &mut *state else {
            return Ok(());
        };
        let held = std::mem::take(held);

        match self.create(header, &held) {
            Ok(file) => {
                *state = State::Open(file);
                Ok(())
            }
            Err(e) => {
                *state = State::Unavailable;
                Err(e)
            }
        }
    }

    fn create(&self, header: &str, held: &[String]) -> io::Result<fs::File> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{header}")?;
        for line in held {
            writeln!(file, "{line}")?;
        }
        Ok(file)
    }
}
