//! Repeating timers driven by the frame loop.
//!
//! Nothing runs on its own: the owner asks [`Scheduler::due`] which tasks have
//! come due and runs them. Every task is identified by a [`TaskToken`] that can
//! be cancelled, so a restart can drop all pending work before new state is
//! installed.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskToken(u64);

#[derive(Debug)]
struct Entry<T> {
    token: TaskToken,
    task: T,
    interval: Duration,
    next_due: Instant,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_token: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_token: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `interval`, first at `now + interval`.
    pub fn every(&mut self, task: T, interval: Duration, now: Instant) -> TaskToken {
        self.every_after(task, interval, interval, now)
    }

    /// Run `task` first at `now + first`, then every `interval`.
    pub fn every_after(
        &mut self,
        task: T,
        first: Duration,
        interval: Duration,
        now: Instant,
    ) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token += 1;
        self.entries.push(Entry {
            token,
            task,
            interval,
            next_due: now + first,
        });
        token
    }

    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_active(&self, token: TaskToken) -> bool {
        self.entries.iter().any(|e| e.token == token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tasks that came due up to `now`, oldest first. A task fires at most
    /// once per call; intervals missed during a stall are skipped, keeping
    /// the original cadence.
    pub fn due(&mut self, now: Instant) -> Vec<(TaskToken, T)> {
        let mut fired: Vec<(Instant, TaskToken, T)> = Vec::new();
        for entry in &mut self.entries {
            if entry.next_due > now {
                continue;
            }
            fired.push((entry.next_due, entry.token, entry.task));
            let behind = now.duration_since(entry.next_due).as_nanos();
            let missed = behind / entry.interval.as_nanos().max(1) + 1;
            entry.next_due += entry.interval * missed as u32;
        }
        fired.sort_by_key(|(at, token, _)| (*at, token.0));
        fired.into_iter().map(|(_, token, task)| (token, task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_after_each_interval() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let token = s.every('a', ms(100), t0);
        assert!(s.due(t0 + ms(99)).is_empty());
        assert_eq!(s.due(t0 + ms(100)), vec![(token, 'a')]);
        assert!(s.due(t0 + ms(150)).is_empty());
        assert_eq!(s.due(t0 + ms(200)), vec![(token, 'a')]);
    }

    #[test]
    fn stalled_frame_fires_each_task_once() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let slow = s.every('s', ms(300), t0);
        let fast = s.every('f', ms(100), t0);
        assert_eq!(s.due(t0 + ms(350)), vec![(fast, 'f'), (slow, 's')]);
        // Cadence is kept: the next firing is at 400, not 450.
        assert!(s.due(t0 + ms(399)).is_empty());
        assert_eq!(s.due(t0 + ms(400)), vec![(fast, 'f')]);
    }

    #[test]
    fn first_firing_can_be_delayed() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let token = s.every_after('d', ms(250), ms(100), t0);
        assert!(s.due(t0 + ms(249)).is_empty());
        assert_eq!(s.due(t0 + ms(250)), vec![(token, 'd')]);
        assert_eq!(s.due(t0 + ms(350)), vec![(token, 'd')]);
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let token = s.every(1, ms(10), t0);
        assert!(s.is_active(token));
        assert!(s.cancel(token));
        assert!(!s.cancel(token));
        assert!(!s.is_active(token));
        assert!(s.due(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn tokens_are_never_reused() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let old = s.every(1, ms(10), t0);
        s.cancel_all();
        assert!(s.is_empty());
        let new = s.every(1, ms(10), t0);
        assert_ne!(old, new);
        assert!(!s.is_active(old));
        assert_eq!(s.len(), 1);
    }
}
