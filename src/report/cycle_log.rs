use crate::core::error::Result;
use crate::optimization::netting::NettedCycle;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for netted cycles, in the order they are found.
pub trait CycleSink {
    fn record(&mut self, cycle: &NettedCycle) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keep cycles in memory.
impl CycleSink for Vec<NettedCycle> {
    fn record(&mut self, cycle: &NettedCycle) -> Result<()> {
        self.push(cycle.clone());
        Ok(())
    }
}

impl<S: CycleSink + ?Sized> CycleSink for &mut S {
    fn record(&mut self, cycle: &NettedCycle) -> Result<()> {
        (**self).record(cycle)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Append-only result log with one line per netted cycle.
///
/// Each line holds the cycle's nodes followed by the netted amount,
/// space separated, e.g. `A B C 5`. The file is truncated when the log
/// is created.
#[derive(Debug)]
pub struct CycleLog {
    writer: BufWriter<File>,
    path: PathBuf,
    lines: u64,
}

impl CycleLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cycles written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

impl CycleSink for CycleLog {
    fn record(&mut self, cycle: &NettedCycle) -> Result<()> {
        writeln!(self.writer, "{}", cycle)?;
        self.lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
