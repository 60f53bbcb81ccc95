//! Background fetching.
//!
//! A dedicated thread owns every source (each behind its page cache) and a
//! single-threaded tokio runtime.  The UI thread sends it [`FeedRequest`]s;
//! for each one, all sources are queried **concurrently** and the poller
//! waits until every one of them has settled, success or failure, before
//! sending a single [`PollMsg::Batch`] back.  One provider failing never
//! cancels or hides the others' results.
//!
//! Requests are processed one at a time, so cache writes never race.  When
//! several requests queue up (fast typing), only the newest is served: the
//! feed would discard answers to the older ones anyway.

use std::sync::mpsc;
use std::thread;

use futures::future::join_all;
use tokio::sync::mpsc as async_mpsc;
use tracing::{debug, error, info};

use crate::cache::CachedSource;
use crate::feed::{FeedRequest, PageBatch, SourceOutcome};
use crate::source::{DataSource, PageRequest};

/// Messages sent from the poller thread to the UI thread.
#[derive(Debug)]
pub enum PollMsg {
    /// Every provider settled for this request.
    Batch(PageBatch),
    /// The poller could not start; no batches will follow.
    Failed(String),
}

pub struct Poller {
    sources: Vec<CachedSource>,
    page_size: usize,
}

impl Poller {
    /// `page_size` is what each size-aware provider is asked for.
    pub fn new(sources: Vec<Box<dyn DataSource>>, page_size: usize) -> Self {
        Self {
            sources: sources.into_iter().map(CachedSource::new).collect(),
            page_size,
        }
    }

    /// Query every source for `request` and collect all outcomes.
    pub async fn fetch(&mut self, request: &FeedRequest) -> PageBatch {
        let page_request = PageRequest::new(
            request.page,
            self.page_size,
            request.signature.query(),
            &request.signature.categories,
        );
        let page_request = &page_request;

        let outcomes = join_all(self.sources.iter_mut().map(|source| async move {
            SourceOutcome {
                variant: source.variant(),
                result: source.get(page_request).await,
            }
        }))
        .await;

        PageBatch {
            request: request.clone(),
            outcomes,
        }
    }
}

/// Sending half kept by the UI thread.
#[derive(Clone)]
pub struct PollHandle {
    tx: async_mpsc::UnboundedSender<FeedRequest>,
}

impl PollHandle {
    /// Queue a request.  Returns `false` once the poller thread has gone.
    pub fn request(&self, request: FeedRequest) -> bool {
        self.tx.send(request).is_ok()
    }
}

/// Spawn the poller thread.
///
/// Returns the request handle and a receiver the main loop should drain on
/// every tick.  The thread exits when the handle is dropped or the receiver
/// goes away.
pub fn spawn(mut poller: Poller) -> (PollHandle, mpsc::Receiver<PollMsg>) {
    let (req_tx, mut req_rx) = async_mpsc::unbounded_channel::<FeedRequest>();
    let (msg_tx, msg_rx) = mpsc::channel();

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = %e, "failed to start poller runtime");
                let _ = msg_tx.send(PollMsg::Failed(e.to_string()));
                return;
            }
        };

        runtime.block_on(serve(&mut poller, &mut req_rx, &msg_tx));
    });

    (PollHandle { tx: req_tx }, msg_rx)
}

/// Answer requests until the handle or the receiver goes away.  Requests
/// queued behind the one just received are skipped in favor of the newest.
async fn serve(
    poller: &mut Poller,
    req_rx: &mut async_mpsc::UnboundedReceiver<FeedRequest>,
    msg_tx: &mpsc::Sender<PollMsg>,
) {
    while let Some(mut request) = req_rx.recv().await {
        while let Ok(newer) = req_rx.try_recv() {
            debug!(page = request.page, "skipping superseded request");
            request = newer;
        }
        let batch = poller.fetch(&request).await;
        // If the receiver is gone the main thread has exited;
        // silently stop polling.
        if msg_tx.send(PollMsg::Batch(batch)).is_err() {
            return;
        }
    }
    info!("poller shutting down");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
