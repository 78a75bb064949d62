use firehose_types::Record;

use crate::error::StreamError;

/// What a consumer observes on its [`Subscription`](crate::Subscription).
///
/// A consumer sees zero or more `Record`s, then at most one terminal
/// event (`Error` or `Complete`). Nothing follows a terminal event.
#[derive(Clone, Debug)]
pub enum HubEvent {
    Record(Record),
    Error(StreamError),
    Complete,
}

impl HubEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Record(_))
    }

    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Error(_) | Self::Complete => None,
        }
    }
}
