/// Implementation of `firehose replay`.
///
/// Feeds a captured stream through the same frame pipeline the live
/// path uses, reading `--chunk-size` bytes at a time, and prints each
/// record. An unterminated final record is dropped, exactly as it would
/// be when a live connection ends.
use std::io;

use anyhow::{Context, Result};
use firehose_decoder::RecordReader;
use tokio::fs::File;
use tokio::io::AsyncRead;

use crate::ReplayArgs;
use crate::output::write_record;

/// Run the `firehose replay` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, a frame
/// cannot be decoded, or stdout cannot be written.
pub async fn run(args: &ReplayArgs) -> Result<()> {
    let input: Box<dyn AsyncRead + Unpin + Send> = if args.file.as_os_str() == "-" {
        Box::new(tokio::io::stdin())
    } else {
        let file = File::open(&args.file)
            .await
            .with_context(|| format!("cannot open {}", args.file.display()))?;
        Box::new(file)
    };

    let mut records = RecordReader::new(input).with_chunk_size(args.chunk_size);
    let mut stdout = io::stdout().lock();

    while let Some(item) = records.next().await {
        let record = item.context("replay terminated")?;
        write_record(&mut stdout, &record)?;
    }

    let stats = records.stats();
    tracing::info!(
        chunks = stats.chunks,
        bytes = stats.bytes,
        frames = stats.frames,
        records = stats.records,
        dropped = stats.dropped,
        "replay finished"
    );
    Ok(())
}
