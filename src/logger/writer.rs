//! Log writer module
//!
//! Access lines go to stdout or an append-only file. The error log file, when
//! configured, is opened here too and handed to the tracing subscriber.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static ACCESS_WRITER: OnceLock<AccessTarget> = OnceLock::new();

enum AccessTarget {
    Stdout,
    File(Mutex<File>),
}

impl AccessTarget {
    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{line}");
                }
            }
        }
    }
}

/// Open or create a log file for appending, creating parent directories
pub fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the access log target; later calls are ignored
pub fn init(access_log_file: Option<&str>) -> io::Result<()> {
    let target = match access_log_file {
        Some(path) => AccessTarget::File(Mutex::new(open_log_file(path)?)),
        None => AccessTarget::Stdout,
    };
    let _ = ACCESS_WRITER.set(target);
    Ok(())
}

/// Write one access line, to stdout when no target was installed
pub fn write_access(line: &str) {
    match ACCESS_WRITER.get() {
        Some(target) => target.write_line(line),
        None => println!("{line}"),
    }
}
