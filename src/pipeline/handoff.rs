//! Cancellable handoff into a bounded queue.
//!
//! A producer offering an item to a full queue waits (backpressure), but it
//! must also notice when a consumer has reported a fatal error. [`hand_off`]
//! races the two and reports whichever happened first. When both are ready
//! the error signal wins.

use tokio::sync::mpsc;

/// Result of offering one item to the queue.
#[derive(Debug)]
pub enum Handoff<T, E> {
    /// The queue accepted the item.
    Delivered,
    /// An error signal arrived first. The item was not enqueued and is dropped.
    Interrupted(E),
    /// Every consumer is gone. The item is returned untouched.
    Closed(T),
}

/// Offers `item` to `queue`, giving up as soon as `signal` yields an error.
///
/// A signal channel whose senders have all been dropped never interrupts.
pub async fn hand_off<T, E>(
    queue: &async_channel::Sender<T>,
    item: T,
    signal: &mut mpsc::Receiver<E>,
) -> Handoff<T, E> {
    let send = queue.send(item);
    tokio::pin!(send);

    tokio::select! {
        biased;

        Some(err) = signal.recv() => Handoff::Interrupted(err),
        sent = &mut send => match sent {
            Ok(()) => Handoff::Delivered,
            Err(async_channel::SendError(item)) => Handoff::Closed(item),
        },
    }
}
