use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use rethink_core::error::Result;

/// Per-worker log file under `<log_dir>/<model>/worker_<id>.log`.
///
/// Each worker task owns its own file, so batches of the same run never
/// interleave lines. The file is truncated on creation; writes after that
/// are best-effort, a full disk must not take the evaluation down with it.
pub struct WorkerLog {
    file: File,
    path: PathBuf,
}

impl WorkerLog {
    pub fn create(log_dir: &Path, model_name: &str, worker_id: usize) -> Result<Self> {
        let dir = log_dir.join(model_name);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("worker_{worker_id}.log"));
        let file = File::create(&path)?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, msg: &str) {
        self.write_line("INFO", msg);
    }

    pub fn error(&mut self, msg: &str) {
        self.write_line("ERROR", msg);
    }

    fn write_line(&mut self, level: &str, msg: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "{stamp} - {level} - {msg}");
        let _ = self.file.flush();
    }
}
