use rtrb::{Consumer, Producer, RingBuffer};

use super::{EngineParams, ParamId, ParameterStore};

/// Default number of pending changes a [`param_channel`] can hold.
pub const PARAM_QUEUE_SIZE: usize = 256;

/// One parameter edit, in the plain-value convention of
/// [`EngineParams::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub id: ParamId,
    pub value: f32,
}

/// Control-thread end of a parameter queue.
pub struct ParamSender {
    tx: Producer<ParamChange>,
}

impl ParamSender {
    /// Queue a change. Returns false if the queue is full and the change
    /// was dropped.
    pub fn send(&mut self, id: ParamId, value: f32) -> bool {
        self.tx.push(ParamChange { id, value }).is_ok()
    }

    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}

/// Audio-thread end of a parameter queue.
pub struct ParamReceiver {
    rx: Consumer<ParamChange>,
}

impl ParamReceiver {
    pub fn pop(&mut self) -> Option<ParamChange> {
        self.rx.pop().ok()
    }
}

impl ParameterStore for ParamReceiver {
    /// Apply every queued change in order. Later changes to the same
    /// parameter win.
    fn read_into(&mut self, params: &mut EngineParams) {
        while let Some(change) = self.pop() {
            params.set(change.id, change.value);
        }
    }
}

/// Lock-free single-producer single-consumer parameter queue.
pub fn param_channel(capacity: usize) -> (ParamSender, ParamReceiver) {
    let (tx, rx) = RingBuffer::<ParamChange>::new(capacity.max(1));
    (ParamSender { tx }, ParamReceiver { rx })
}
