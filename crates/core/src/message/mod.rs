//! One-way channel from the rendering thread to the control thread.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::dsp::AmplitudeMetric;

/// Metric posted once per connected quantum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SumMessage {
    pub sum: f64,
    pub length: usize,
}

impl From<AmplitudeMetric> for SumMessage {
    fn from(metric: AmplitudeMetric) -> Self {
        Self {
            sum: metric.sum,
            length: metric.length,
        }
    }
}

/// Endpoint a host attaches to a processor for outbound messages.
///
/// Implementations must return without blocking. Delivery is fire and forget:
/// there is no acknowledgement and no way to report a failed post.
pub trait MessagePort: Send {
    fn post_message(&self, message: SumMessage);
}

/// Port that discards every message; used when nobody listens.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPort;

impl MessagePort for NullPort {
    fn post_message(&self, _message: SumMessage) {}
}

/// Rendering-thread half of [`message_channel`].
#[derive(Debug, Clone)]
pub struct ChannelPort {
    tx: Sender<SumMessage>,
}

impl MessagePort for ChannelPort {
    fn post_message(&self, message: SumMessage) {
        // Unbounded: never blocks. The queue grows a block at a time as the
        // control side falls behind. A dropped receiver discards the message.
        let _ = self.tx.send(message);
    }
}

/// Control-thread half of [`message_channel`].
#[derive(Debug, Clone)]
pub struct ControlReceiver {
    rx: Receiver<SumMessage>,
}

impl ControlReceiver {
    /// Returns the next queued message, if any, without waiting.
    pub fn try_recv(&self) -> Option<SumMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until every port is dropped, yielding messages in send order.
    pub fn iter(&self) -> impl Iterator<Item = SumMessage> + '_ {
        self.rx.iter()
    }

    /// Collects whatever is queued right now.
    pub fn drain(&self) -> Vec<SumMessage> {
        self.rx.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Creates a FIFO, unbounded port/receiver pair.
pub fn message_channel() -> (ChannelPort, ControlReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ChannelPort { tx }, ControlReceiver { rx })
}

/// Packages amplitude metrics and posts them on the attached port.
pub struct MetricEmitter {
    port: Box<dyn MessagePort>,
}

impl MetricEmitter {
    pub fn new(port: Box<dyn MessagePort>) -> Self {
        Self { port }
    }

    pub fn emit(&self, sum: f64, length: usize) {
        self.port.post_message(SumMessage { sum, length });
    }
}

impl Default for MetricEmitter {
    fn default() -> Self {
        Self::new(Box::new(NullPort))
    }
}

impl std::fmt::Debug for MetricEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricEmitter").finish()
    }
}
