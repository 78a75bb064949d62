/// Implementation of `firehose stream`.
///
/// Builds the signed HTTP source, attaches one consumer to a
/// [`MulticastHub`], and prints records until the stream ends, the
/// `--limit` is reached, or Ctrl-C arrives. The consumer is always
/// detached on the way out, which closes the upstream connection.
use std::io;

use anyhow::{Context, Result};
use firehose_client::StreamClient;
use firehose_hub::{HubEvent, MulticastHub};

use crate::StreamArgs;
use crate::output::write_record;

/// Run the `firehose stream` command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the upstream fails
/// (including a non-success HTTP status), a frame cannot be decoded, or
/// stdout cannot be written.
pub async fn run(args: &StreamArgs) -> Result<()> {
    let client = args
        .track
        .iter()
        .fold(
            StreamClient::builder()
                .with_api_key(&args.api_key)
                .with_api_secret(&args.api_secret)
                .with_token(&args.token)
                .with_token_secret(&args.token_secret)
                .with_endpoint(&args.endpoint),
            |builder, phrase| builder.with_track_phrase(phrase),
        )
        .build()
        .context("invalid stream configuration")?;

    let hub = MulticastHub::new(client);
    let mut subscription = hub.subscribe();
    let mut stdout = io::stdout().lock();
    let mut delivered = 0usize;

    let outcome = loop {
        let event = tokio::select! {
            event = subscription.next() => event,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(delivered, "interrupted");
                break Ok(());
            }
        };

        match event {
            Some(HubEvent::Record(record)) => {
                if let Err(e) = write_record(&mut stdout, &record) {
                    break Err(e);
                }
                delivered += 1;

                if args.limit.is_some_and(|limit| delivered >= limit) {
                    tracing::info!(delivered, "record limit reached");
                    break Ok(());
                }
            }
            Some(HubEvent::Error(err)) => {
                break Err(anyhow::Error::new(err).context("stream terminated"));
            }
            Some(HubEvent::Complete) | None => {
                tracing::info!(delivered, "stream completed");
                break Ok(());
            }
        }
    };

    subscription.detach();
    outcome
}
