use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use futures::{future::BoxFuture, FutureExt};
use thiserror::Error;
use tokio::sync::{
    mpsc::{self, error::TryRecvError},
    Mutex, Notify,
};
use tracing::debug;

use crate::{Contravariant, PartiallyApplied};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue has been shut down")]
    Shutdown,
}

// the backing channel; shared by every view of one queue
struct Channel<T> {
    sender: mpsc::Sender<T>,
    receiver: Mutex<mpsc::Receiver<T>>,
    shut_down: AtomicBool,
    shutdown_signal: Notify,
}

// the element-type independent half of a queue
trait Control: Send + Sync {
    fn size(&self) -> usize;
    fn capacity(&self) -> usize;
    fn shutdown(&self);
    fn is_shutdown(&self) -> bool;
}

impl<T: Send> Control for Channel<T> {
    fn size(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            debug!(pending = self.size(), "queue shut down");
            self.shutdown_signal.notify_waiters();
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl<T: Send> Channel<T> {
    /// Run `operation` unless the queue is, or becomes, shut down first.
    async fn until_shutdown<F: Future>(&self, operation: F) -> Result<F::Output, QueueError> {
        // registered before the flag check, so a concurrent shutdown cannot be missed
        let signalled = self.shutdown_signal.notified();
        if self.is_shutdown() {
            return Err(QueueError::Shutdown);
        }
        tokio::select! {
            output = operation => Ok(output),
            _ = signalled => Err(QueueError::Shutdown),
        }
    }

    async fn offer(&self, value: T) -> Result<(), QueueError> {
        self.until_shutdown(self.sender.send(value))
            .await?
            .map_err(|_| QueueError::Shutdown)
    }

    async fn take(&self) -> Result<T, QueueError> {
        let mut receiver = self.until_shutdown(self.receiver.lock()).await?;
        self.until_shutdown(receiver.recv())
            .await?
            .ok_or(QueueError::Shutdown)
    }

    fn poll(&self) -> Result<Option<T>, QueueError> {
        if self.is_shutdown() {
            return Err(QueueError::Shutdown);
        }
        // a parked taker is first in line for whatever arrives
        let Ok(mut receiver) = self.receiver.try_lock() else {
            return Ok(None);
        };
        match receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(QueueError::Shutdown),
        }
    }
}

/// A bounded, asynchronous FIFO queue accepting `In` on its enqueue side and yielding `Out` on
/// its dequeue side.
///
/// Cloning a queue, or adapting either side, yields another view of the same underlying
/// channel. Back-pressure, ordering and shutdown are shared by all views.
pub struct Queue<In, Out> {
    offer: Arc<dyn Fn(In) -> BoxFuture<'static, Result<(), QueueError>> + Send + Sync>,
    take: Arc<dyn Fn() -> BoxFuture<'static, Result<Out, QueueError>> + Send + Sync>,
    poll: Arc<dyn Fn() -> Result<Option<Out>, QueueError> + Send + Sync>,
    control: Arc<dyn Control>,
}

impl<In, Out> Clone for Queue<In, Out> {
    fn clone(&self) -> Self {
        Self {
            offer: self.offer.clone(),
            take: self.take.clone(),
            poll: self.poll.clone(),
            control: self.control.clone(),
        }
    }
}

impl<T: Send + 'static> Queue<T, T> {
    /// A queue holding at most `capacity` elements (at least one).
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let channel = Arc::new(Channel {
            sender,
            receiver: Mutex::new(receiver),
            shut_down: AtomicBool::new(false),
            shutdown_signal: Notify::new(),
        });

        let offering = channel.clone();
        let taking = channel.clone();
        let polling = channel.clone();
        Queue {
            offer: Arc::new(move |value: T| {
                let channel = offering.clone();
                async move { channel.offer(value).await }.boxed()
            }),
            take: Arc::new(move || {
                let channel = taking.clone();
                async move { channel.take().await }.boxed()
            }),
            poll: Arc::new(move || polling.poll()),
            control: channel,
        }
    }
}

impl<In: 'static, Out: 'static> Queue<In, Out> {
    /// Enqueue a value, waiting for room if the queue is full.
    pub fn offer(&self, value: In) -> BoxFuture<'static, Result<(), QueueError>> {
        (self.offer)(value)
    }

    /// Dequeue the oldest value, waiting for one if the queue is empty.
    pub fn take(&self) -> BoxFuture<'static, Result<Out, QueueError>> {
        (self.take)()
    }

    /// Dequeue the oldest value if one is ready and no [`Queue::take`] is already waiting.
    ///
    /// A waiting taker is ahead of the poller: while one is parked this returns `Ok(None)`,
    /// even if a value has just arrived and the taker has not been woken to collect it yet.
    pub fn poll(&self) -> Result<Option<Out>, QueueError> {
        (self.poll)()
    }

    pub fn size(&self) -> usize {
        self.control.size()
    }

    pub fn capacity(&self) -> usize {
        self.control.capacity()
    }

    /// Shut the queue down. Pending and future offers and takes fail with
    /// [`QueueError::Shutdown`].
    pub fn shutdown(&self) {
        self.control.shutdown()
    }

    pub fn is_shutdown(&self) -> bool {
        self.control.is_shutdown()
    }

    /// Translate every value via `f` before it is placed in the queue. The dequeue side is
    /// untouched.
    pub fn contramap_offer<In0: 'static>(
        self,
        f: impl Fn(In0) -> In + Send + Sync + 'static,
    ) -> Queue<In0, Out> {
        let offer = self.offer;
        Queue {
            offer: Arc::new(move |value: In0| offer(f(value))),
            take: self.take,
            poll: self.poll,
            control: self.control,
        }
    }

    /// Translate every value via `f` as it is taken from the queue.
    pub fn map_take<Out2: 'static>(
        self,
        f: impl Fn(Out) -> Out2 + Send + Sync + 'static,
    ) -> Queue<In, Out2> {
        let f = Arc::new(f);
        let take = self.take;
        let poll = self.poll;
        let take_f = f.clone();
        Queue {
            offer: self.offer,
            take: Arc::new(move || {
                let f = take_f.clone();
                take().map(move |taken| taken.map(|value| f(value))).boxed()
            }),
            poll: Arc::new(move || poll().map(|ready| ready.map(|value| f(value)))),
            control: self.control,
        }
    }
}

impl<Out: 'static> Contravariant for Queue<PartiallyApplied, Out> {
    type Consumer<X> = Queue<X, Out>;

    fn contramap<A: 'static, B: 'static>(
        input: Self::Consumer<A>,
        f: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Self::Consumer<B> {
        input.contramap_offer(f)
    }
}
