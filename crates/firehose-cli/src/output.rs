use std::io::Write;

use anyhow::{Context, Result};
use firehose_types::Record;

/// Write one record as a JSON line and flush, so piped consumers see
/// records as they arrive.
pub fn write_record(out: &mut impl Write, record: &Record) -> Result<()> {
    serde_json::to_writer(&mut *out, record).context("failed to serialize record")?;
    writeln!(out).context("failed to write record")?;
    out.flush().context("failed to flush stdout")
}
