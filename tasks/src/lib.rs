#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative timed tasks driven by an explicit clock.
//!
//! A [`Script`] is an ordered list of `(action, then_wait)` steps. Spawning a
//! script on a [`Timeline`] yields a [`TaskHandle`]; every call to
//! [`Timeline::advance`] emits the actions whose time has come, in due-time
//! order. Tasks belong to a [`TaskGroup`] so related work can be cancelled
//! together, and cancellation emits each task's cleanup actions instead of its
//! remaining steps.

use std::{collections::VecDeque, time::Duration};

pub use boss_room_core::TaskGroup;

/// Identifier of a task spawned on a [`Timeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Numeric value of the handle, unique per timeline.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Step<A> {
    action: Option<A>,
    then_wait: Duration,
}

/// Ordered list of timed steps describing one task.
#[derive(Clone, Debug)]
pub struct Script<A> {
    group: TaskGroup,
    steps: Vec<Step<A>>,
    cleanup: Vec<A>,
}

impl<A> Script<A> {
    /// Creates an empty script belonging to `group`.
    #[must_use]
    pub fn new(group: TaskGroup) -> Self {
        Self {
            group,
            steps: Vec::new(),
            cleanup: Vec::new(),
        }
    }

    /// Appends a step that emits `action` and then waits `then_wait`.
    #[must_use]
    pub fn then(mut self, action: A, then_wait: Duration) -> Self {
        self.steps.push(Step {
            action: Some(action),
            then_wait,
        });
        self
    }

    /// Appends a pause without an action.
    #[must_use]
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(Step {
            action: None,
            then_wait: duration,
        });
        self
    }

    /// Registers an action emitted if the task is cancelled before finishing.
    #[must_use]
    pub fn on_cancel(mut self, action: A) -> Self {
        self.cleanup.push(action);
        self
    }

    /// Group the script belongs to.
    #[must_use]
    pub const fn group(&self) -> TaskGroup {
        self.group
    }

    /// Number of steps in the script.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug)]
struct Task<A> {
    handle: TaskHandle,
    group: TaskGroup,
    steps: VecDeque<Step<A>>,
    due_at: Duration,
    cleanup: Vec<A>,
}

/// Clock-driven scheduler for cooperative tasks.
#[derive(Debug)]
pub struct Timeline<A> {
    now: Duration,
    next_id: u64,
    tasks: Vec<Task<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Timeline<A> {
    /// Creates an empty timeline at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Current timeline clock.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Starts `script` now. Leading steps that are already due emit their
    /// actions into `out` immediately.
    pub fn spawn(&mut self, script: Script<A>, out: &mut Vec<A>) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.push(Task {
            handle,
            group: script.group,
            steps: script.steps.into(),
            due_at: self.now,
            cleanup: script.cleanup,
        });
        self.run_due(out);
        handle
    }

    /// Advances the clock by `dt` and emits every action that became due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<A>) {
        self.now = self.now.saturating_add(dt);
        self.run_due(out);
    }

    /// Cancels a single task, emitting its cleanup actions. Returns `false`
    /// when the task already finished or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle, out: &mut Vec<A>) -> bool {
        self.cancel_where(|task| task.handle == handle, out) > 0
    }

    /// Cancels every task in `group`, returning how many were cancelled.
    pub fn cancel_group(&mut self, group: TaskGroup, out: &mut Vec<A>) -> usize {
        self.cancel_where(|task| task.group == group, out)
    }

    /// Cancels every task, returning how many were cancelled.
    pub fn cancel_all(&mut self, out: &mut Vec<A>) -> usize {
        self.cancel_where(|_| true, out)
    }

    /// Reports whether the task is still pending.
    #[must_use]
    pub fn is_running(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|task| task.handle == handle)
    }

    /// Number of pending tasks in `group`.
    #[must_use]
    pub fn running_in(&self, group: TaskGroup) -> usize {
        self.tasks.iter().filter(|task| task.group == group).count()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Reports whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn cancel_where<F>(&mut self, predicate: F, out: &mut Vec<A>) -> usize
    where
        F: Fn(&Task<A>) -> bool,
    {
        let mut cancelled = 0;
        let mut kept = Vec::with_capacity(self.tasks.len());
        for task in self.tasks.drain(..) {
            if predicate(&task) {
                out.extend(task.cleanup);
                cancelled += 1;
            } else {
                kept.push(task);
            }
        }
        self.tasks = kept;
        cancelled
    }

    fn run_due(&mut self, out: &mut Vec<A>) {
        while let Some(index) = self.next_due() {
            let task = &mut self.tasks[index];
            let Some(step) = task.steps.pop_front() else {
                let _ = self.tasks.remove(index);
                continue;
            };
            if let Some(action) = step.action {
                out.push(action);
            }
            task.due_at = task.due_at.saturating_add(step.then_wait);
            if task.steps.is_empty() && step.then_wait.is_zero() {
                let _ = self.tasks.remove(index);
            }
        }
    }

    fn next_due(&self) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_at <= self.now)
            .min_by_key(|(_, task)| (task.due_at, task.handle))
            .map(|(index, _)| index)
    }
}
