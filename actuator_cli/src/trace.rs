//! CSV trace of every poll (`home --trace FILE`).

use std::fs::File;
use std::path::Path;

use actuator_core::TickRecord;
use eyre::WrapErr;
use serde::Serialize;

#[derive(Serialize)]
struct TraceRow {
    attempt: u32,
    tick: u64,
    phase: &'static str,
    code: u8,
    zone: &'static str,
    x: &'static str,
    y: &'static str,
    direction: &'static str,
    status: &'static str,
}

impl From<&TickRecord> for TraceRow {
    fn from(r: &TickRecord) -> Self {
        Self {
            attempt: r.attempt,
            tick: r.tick,
            phase: r.phase.name(),
            code: r.phase.code(),
            zone: r.zone.name(),
            x: r.x.as_str(),
            y: r.y.as_str(),
            direction: r.direction.as_str(),
            status: r.status.as_str(),
        }
    }
}

pub struct TraceWriter {
    inner: csv::Writer<File>,
}

impl TraceWriter {
    pub fn create(path: &Path) -> eyre::Result<Self> {
        let inner = csv::Writer::from_path(path)
            .wrap_err_with(|| format!("create trace file {}", path.display()))?;
        Ok(Self { inner })
    }

    pub fn write(&mut self, record: &TickRecord) -> eyre::Result<()> {
        self.inner
            .serialize(TraceRow::from(record))
            .wrap_err("write trace row")
    }

    pub fn finish(mut self) -> eyre::Result<()> {
        self.inner.flush().wrap_err("flush trace file")
    }
}
