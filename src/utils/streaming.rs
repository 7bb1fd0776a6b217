//! Async record streams.
//!
//! A [`RecordStream`] is the consumer side of one running search. Records
//! arrive in page order, one handoff at a time; the producer cannot run more
//! than one record ahead of the consumer.

use futures_util::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::search::SearchError;

/// Stream of records from one search.
///
/// Items are `Ok(record)` until the stream ends, optionally with one final
/// `Err`. Dropping the stream stops the search and releases any page request
/// still in flight.
#[derive(Debug)]
pub struct RecordStream<T> {
    receiver: mpsc::Receiver<Result<T, SearchError>>,
    abandoned: Option<oneshot::Receiver<SearchError>>,
    producer: Option<JoinHandle<()>>,
    received: usize,
}

impl<T> RecordStream<T> {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Result<T, SearchError>>,
        abandoned: oneshot::Receiver<SearchError>,
        producer: JoinHandle<()>,
    ) -> Self {
        Self {
            receiver,
            abandoned: Some(abandoned),
            producer: Some(producer),
            received: 0,
        }
    }

    /// Get the next item from the stream (async)
    ///
    /// Returns `None` when the stream is exhausted.
    pub async fn next(&mut self) -> Option<Result<T, SearchError>> {
        match self.receiver.recv().await {
            Some(item) => {
                if item.is_ok() {
                    self.received += 1;
                }
                Some(item)
            }
            None => self.take_abandonment().map(Err),
        }
    }

    /// The producer's abandonment, once the channel is drained.
    ///
    /// The producer reports it before releasing its sender, so it is already
    /// in place when the channel closes. Yielded at most once.
    fn take_abandonment(&mut self) -> Option<SearchError> {
        self.abandoned.take().and_then(|mut rx| rx.try_recv().ok())
    }

    /// Number of records (not errors) received so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Stop the search.
    ///
    /// Items already handed off can still be read; nothing new arrives.
    pub fn cancel(&mut self) {
        self.receiver.close();
    }

    /// Collect every remaining item, including the terminal error if any
    pub async fn collect_all(mut self) -> Vec<Result<T, SearchError>> {
        let mut items = Vec::new();

        while let Some(item) = self.next().await {
            items.push(item);
        }

        items
    }

    /// Collect the records, treating the cap sentinel as normal completion.
    ///
    /// Returns the first real failure instead; records received before it
    /// are discarded.
    pub async fn try_collect(mut self) -> Result<Vec<T>, SearchError> {
        let mut records = Vec::new();

        while let Some(item) = self.next().await {
            match item {
                Ok(record) => records.push(record),
                Err(e) if e.is_cap_reached() => break,
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }
}

impl<T> Stream for RecordStream<T> {
    type Item = Result<T, SearchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(item)) => {
                if item.is_ok() {
                    self.received += 1;
                }
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => Poll::Ready(self.take_abandonment().map(Err)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for RecordStream<T> {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}
