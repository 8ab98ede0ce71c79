//! Tick scheduler on a virtual millisecond clock.
//!
//! The owner advances the clock (from wall time in a real front end, or in
//! fixed steps in the simulator) and polls for due ticks and tasks. At most
//! one tick is in flight: a firing that comes due before the previous tick
//! was completed is dropped, not queued.

use super::constants::{SPEED_MULTIPLIERS, TICK_INTERVAL_MS};
use serde::{Deserialize, Serialize};

/// Owning handle to a delayed task. Only the scheduler can mint one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, PartialEq)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    due_at: u64,
    task: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickScheduler<T> {
    now_ms: u64,
    next_tick_at: u64,
    speed: u32,
    paused: bool,
    paused_at: u64,
    in_flight: Option<u64>,
    sequence: u64,
    skipped: u64,
    next_handle: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TickScheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_tick_at: TICK_INTERVAL_MS,
            speed: 1,
            paused: false,
            paused_at: 0,
            in_flight: None,
            sequence: 0,
            skipped: 0,
            next_handle: 0,
            tasks: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Milliseconds between ticks at the current speed.
    pub fn interval_ms(&self) -> u64 {
        TICK_INTERVAL_MS / self.speed as u64
    }

    /// Changes the speed multiplier. Returns false (and changes nothing) for
    /// unsupported multipliers.
    pub fn set_speed(&mut self, speed: u32) -> bool {
        if !SPEED_MULTIPLIERS.contains(&speed) {
            return false;
        }
        self.speed = speed;
        self.next_tick_at = self.next_tick_at.min(self.now_ms + self.interval_ms());
        true
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.paused_at = self.now_ms;
        }
    }

    /// Resumes ticking one full interval from now. Pending tasks are pushed
    /// back by the time spent paused.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        let paused_for = self.now_ms - self.paused_at;
        for task in &mut self.tasks {
            task.due_at += paused_for;
        }
        self.next_tick_at = self.now_ms + self.interval_ms();
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        self.now_ms += elapsed_ms;
    }

    /// Sequence number of the last tick handed out.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Stamps a tick fired outside the clock. Shares the counter with
    /// [`poll_tick`](Self::poll_tick).
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Firings dropped because a tick was still in flight.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Hands out the next tick if one is due. The caller must report it back
    /// through [`complete_tick`](Self::complete_tick) before another fires.
    pub fn poll_tick(&mut self) -> Option<u64> {
        if self.paused || self.now_ms < self.next_tick_at {
            return None;
        }
        self.next_tick_at = self.now_ms + self.interval_ms();
        if self.in_flight.is_some() {
            self.skipped += 1;
            return None;
        }
        self.sequence += 1;
        self.in_flight = Some(self.sequence);
        Some(self.sequence)
    }

    pub fn complete_tick(&mut self, sequence: u64) {
        if self.in_flight == Some(sequence) {
            self.in_flight = None;
        }
    }

    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.tasks.push(ScheduledTask {
            handle,
            due_at: self.now_ms + delay_ms,
            task,
        });
        handle
    }

    /// Drops a pending task. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Removes and returns every task that is due, in due order.
    pub fn take_due_tasks(&mut self) -> Vec<(TaskHandle, T)> {
        if self.paused {
            return Vec::new();
        }
        let now = self.now_ms;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.due_at <= now);
        self.tasks = pending;
        due.sort_by_key(|t| (t.due_at, t.handle.0));
        due.into_iter().map(|t| (t.handle, t.task)).collect()
    }
}
