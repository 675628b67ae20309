use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

use super::HostError;

/// One-shot callback run on a later turn of the host task queue.
pub type Task = Box<dyn FnOnce()>;

/// Repeating callback; returning `Break` stops the interval.
pub type Tick = Box<dyn FnMut() -> ControlFlow<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u32);

enum TaskKind {
    Once(Task),
    Repeat(Rc<RefCell<Tick>>),
}

struct TaskEntry {
    kind: TaskKind,
    timer: Option<JoinHandle<()>>,
}

/// Host task queue. Timers run on the tokio runtime but only send task ids;
/// callbacks run on the owning thread when the queue is pumped.
pub struct TaskQueue {
    handle: Handle,
    next_id: Cell<u32>,
    tasks: RefCell<HashMap<u32, TaskEntry>>,
    fired_rx: RefCell<UnboundedReceiver<u32>>,
    fired_tx: UnboundedSender<u32>,
}

impl TaskQueue {
    pub fn new() -> Result<Self, HostError> {
        let handle = Handle::try_current().map_err(|_| HostError::NoRuntime)?;
        let (tx, rx) = unbounded_channel();
        Ok(Self {
            handle,
            next_id: Cell::new(1),
            tasks: RefCell::new(HashMap::new()),
            fired_rx: RefCell::new(rx),
            fired_tx: tx,
        })
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1).max(1));
        id
    }

    /// Queue `task` for the next turn. Never runs synchronously.
    pub fn queue(&self, task: Task) -> TaskId {
        let id = self.next_id();
        self.tasks.borrow_mut().insert(
            id,
            TaskEntry {
                kind: TaskKind::Once(task),
                timer: None,
            },
        );
        let _ = self.fired_tx.send(id);
        TaskId(id)
    }

    /// Run `tick` every `period` until it breaks or the interval is cleared.
    pub fn set_interval(&self, period: Duration, tick: Tick) -> TaskId {
        let id = self.next_id();
        let period = period.max(Duration::from_millis(1));
        let tx = self.fired_tx.clone();
        let timer = self.handle.spawn(async move {
            loop {
                sleep(period).await;
                if tx.send(id).is_err() {
                    break;
                }
            }
        });

        self.tasks.borrow_mut().insert(
            id,
            TaskEntry {
                kind: TaskKind::Repeat(Rc::new(RefCell::new(tick))),
                timer: Some(timer),
            },
        );
        TaskId(id)
    }

    pub fn clear(&self, id: TaskId) {
        if let Some(entry) = self.tasks.borrow_mut().remove(&id.0) {
            if let Some(timer) = entry.timer {
                timer.abort();
            }
        }
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.borrow().contains_key(&id.0)
    }

    pub fn has_pending(&self) -> bool {
        !self.tasks.borrow().is_empty()
    }

    /// Run every task that became due before this call. Work queued while
    /// running waits for the next call.
    pub fn run_pending(&self) -> usize {
        let mut fired = Vec::new();
        {
            let mut rx = self.fired_rx.borrow_mut();
            while let Ok(id) = rx.try_recv() {
                fired.push(id);
            }
        }

        let mut ran = 0;
        for id in fired {
            if self.run_one(id) {
                ran += 1;
            }
        }
        if ran > 0 {
            trace!(target: "dom_compat", ran, "ran host tasks");
        }
        ran
    }

    fn run_one(&self, id: u32) -> bool {
        let tick = {
            let mut tasks = self.tasks.borrow_mut();
            let repeating = match tasks.get(&id).map(|entry| &entry.kind) {
                Some(TaskKind::Repeat(tick)) => Some(Rc::clone(tick)),
                Some(TaskKind::Once(_)) => None,
                None => return false,
            };
            match repeating {
                Some(tick) => tick,
                None => {
                    let entry = tasks.remove(&id);
                    drop(tasks);
                    if let Some(TaskEntry {
                        kind: TaskKind::Once(task),
                        ..
                    }) = entry
                    {
                        task();
                    }
                    return true;
                }
            }
        };

        let flow = {
            let mut tick = tick.borrow_mut();
            (*tick)()
        };
        if flow.is_break() {
            self.clear(TaskId(id));
        }
        true
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        for (_, entry) in self.tasks.get_mut().drain() {
            if let Some(timer) = entry.timer {
                timer.abort();
            }
        }
    }
}
