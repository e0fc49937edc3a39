//! Tick-based task scheduler.
//!
//! Tasks are plain values, not closures: the main loop receives the due ones
//! from `advance()` and decides what they mean. Each scheduled task has a
//! `TaskHandle` whose `cancel()` guarantees the task is never returned.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use realmkeep_model::{Tick, UserId};

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// The redraw started by a transition has landed.
    RedrawDone(UserId),
    /// A preview's delay elapsed; its pending commit is due.
    CommitDue(UserId),
}

impl Task {
    pub fn user(&self) -> UserId {
        match *self {
            Task::RedrawDone(user) | Task::CommitDue(user) => user,
        }
    }
}

/// Cancellation handle for one scheduled task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug)]
struct Scheduled {
    task: Task,
    cancelled: Rc<Cell<bool>>,
}

#[derive(Debug, Default)]
pub struct TaskScheduler {
    now: Tick,
    next_id: TaskId,
    /// Keyed by (due tick, id) so same-tick tasks run in scheduling order.
    queue: BTreeMap<(Tick, TaskId), Scheduled>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    /// Schedule `task` to come due `delay_ticks` from now (at least one).
    pub fn schedule(&mut self, task: Task, delay_ticks: u64) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now.saturating_add(delay_ticks.max(1));
        let cancelled = Rc::new(Cell::new(false));
        self.queue.insert(
            (due, id),
            Scheduled {
                task,
                cancelled: Rc::clone(&cancelled),
            },
        );
        TaskHandle { id, cancelled }
    }

    /// Advance one tick and return the tasks now due, in order.
    pub fn advance(&mut self) -> Vec<(TaskId, Task)> {
        self.now += 1;
        let later = self.queue.split_off(&(self.now + 1, 0));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_iter()
            .filter(|(_, s)| !s.cancelled.get())
            .map(|((_, id), s)| (id, s.task))
            .collect()
    }

    /// Cancel every task belonging to `user`.
    pub fn cancel_for(&mut self, user: UserId) -> usize {
        let mut cancelled = 0;
        for scheduled in self.queue.values() {
            if scheduled.task.user() == user && !scheduled.cancelled.get() {
                scheduled.cancelled.set(true);
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Tasks still waiting that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.queue.values().filter(|s| !s.cancelled.get()).count()
    }
}
