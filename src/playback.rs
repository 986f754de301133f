//! Two-phase replay of a search result.
//!
//! A playback first emits every finalized cell, then every path cell at a
//! slower pace, then `Finished`. Each playback is stamped with the epoch of
//! the scheduler that started it; bumping the epoch drops everything a
//! superseded playback still had pending.

use crate::grid::Position;
use clap::ValueEnum;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Path cells are drawn this many times slower than explored cells.
pub const PATH_SLOWDOWN: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Speed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl Speed {
    /// Milliseconds between two exploration emissions.
    pub fn delay(self) -> u64 {
        match self {
            Speed::Fast => 5,
            Speed::Normal => 10,
            Speed::Slow => 20,
        }
    }

    /// Milliseconds between two path emissions.
    pub fn path_delay(self) -> u64 {
        self.delay() * PATH_SLOWDOWN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Visited(Position),
    OnPath(Position),
    Finished,
}

/// An event and the time, relative to playback start, at which it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    pub at: u64,
    pub event: PlaybackEvent,
}

/// Lays out the timeline of a playback.
///
/// Explored cell `i` fires at `i * delay`. The path phase starts at
/// `visited.len() * delay`, path cell `j` fires at `start + j * delay * 5`,
/// and `Finished` shares the time of the last path cell (or the phase start
/// when there is no path).
pub fn build_schedule(visited: &[Position], path: &[Position], speed: Speed) -> Vec<Emission> {
    let delay = speed.delay();
    let path_delay = speed.path_delay();
    let mut schedule = Vec::with_capacity(visited.len() + path.len() + 1);

    for (i, &pos) in visited.iter().enumerate() {
        schedule.push(Emission {
            at: i as u64 * delay,
            event: PlaybackEvent::Visited(pos),
        });
    }

    let path_start = visited.len() as u64 * delay;
    for (j, &pos) in path.iter().enumerate() {
        schedule.push(Emission {
            at: path_start + j as u64 * path_delay,
            event: PlaybackEvent::OnPath(pos),
        });
    }

    let finished_at = match path.len() {
        0 => path_start,
        n => path_start + (n as u64 - 1) * path_delay,
    };
    schedule.push(Emission {
        at: finished_at,
        event: PlaybackEvent::Finished,
    });
    schedule
}

/// Cooperative task queue over a logical clock.
///
/// The owner polls it with the elapsed time; every due emission comes out in
/// schedule order as long as the queue's epoch is still the current one.
#[derive(Debug)]
pub struct PlaybackQueue {
    pending: VecDeque<Emission>,
    epoch: u64,
    current: Arc<AtomicU64>,
    cancelled: bool,
}

impl PlaybackQueue {
    fn new(schedule: Vec<Emission>, epoch: u64, current: Arc<AtomicU64>) -> Self {
        PlaybackQueue {
            pending: schedule.into(),
            epoch,
            current,
            cancelled: false,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.epoch
    }

    /// Whether the queue was superseded before it ran out. Stays true after
    /// `poll` has dropped the leftovers.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled || (!self.is_current() && !self.pending.is_empty())
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time of the next pending emission.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.front().map(|e| e.at)
    }

    /// Takes every emission due at or before `now`.
    ///
    /// A superseded queue discards what it still holds and yields nothing.
    pub fn poll(&mut self, now: u64) -> Vec<PlaybackEvent> {
        if !self.is_current() {
            if !self.pending.is_empty() {
                debug!(
                    "dropping {} pending emissions of superseded playback {}",
                    self.pending.len(),
                    self.epoch
                );
                self.pending.clear();
                self.cancelled = true;
            }
            return Vec::new();
        }

        let mut due = Vec::new();
        while self.pending.front().is_some_and(|e| e.at <= now) {
            if let Some(emission) = self.pending.pop_front() {
                due.push(emission.event);
            }
        }
        due
    }
}

/// Starts playbacks and owns the epoch counter that invalidates them.
#[derive(Debug, Default)]
pub struct Scheduler {
    epoch: Arc<AtomicU64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Supersedes every playback started so far. Returns the new epoch.
    pub fn cancel_all(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Supersedes earlier playbacks and returns a queue for the caller to
    /// poll on its own clock.
    pub fn queue(&self, visited: &[Position], path: &[Position], speed: Speed) -> PlaybackQueue {
        let epoch = self.cancel_all();
        PlaybackQueue::new(
            build_schedule(visited, path, speed),
            epoch,
            Arc::clone(&self.epoch),
        )
    }

    /// Supersedes earlier playbacks and replays the sequences on a driver
    /// thread in real time. Returns without waiting for any emission.
    pub fn play(&self, visited: &[Position], path: &[Position], speed: Speed) -> PlaybackHandle {
        let queue = self.queue(visited, path, speed);
        let epoch = queue.epoch();
        let (tx, rx) = unbounded();
        let finished = Arc::new(AtomicBool::new(false));

        info!(
            "playback {} started: {} explored, {} on path, {:?} speed",
            epoch,
            visited.len(),
            path.len(),
            speed
        );

        let driver = {
            let finished = Arc::clone(&finished);
            thread::spawn(move || drive(queue, tx, finished))
        };

        PlaybackHandle {
            events: rx,
            finished,
            epoch,
            current: Arc::clone(&self.epoch),
            driver: Some(driver),
        }
    }
}

/// Runs a queue against the wall clock. Returns whether `Finished` fired.
fn drive(mut queue: PlaybackQueue, tx: Sender<PlaybackEvent>, finished: Arc<AtomicBool>) -> bool {
    let start = Instant::now();
    while let Some(due) = queue.next_due() {
        if !queue.is_current() {
            break;
        }
        let deadline = start + Duration::from_millis(due);
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }

        let batch = queue.poll(due);
        forward(&queue, batch, &tx, &finished);
    }
    // Drop whatever a cancellation left behind.
    queue.poll(u64::MAX);
    finished.load(Ordering::Acquire)
}

/// Sends a polled batch, re-checking the epoch before every event so a
/// cancel that lands mid-batch stops it. Returns how many were sent.
fn forward(
    queue: &PlaybackQueue,
    batch: Vec<PlaybackEvent>,
    tx: &Sender<PlaybackEvent>,
    finished: &AtomicBool,
) -> usize {
    let mut sent = 0;
    for event in batch {
        if !queue.is_current() {
            break;
        }
        if event == PlaybackEvent::Finished {
            finished.store(true, Ordering::Release);
        }
        // The receiver may be gone; the run still counts as completed.
        let _ = tx.send(event);
        sent += 1;
    }
    sent
}

/// Caller's side of a running playback.
#[derive(Debug)]
pub struct PlaybackHandle {
    events: Receiver<PlaybackEvent>,
    finished: Arc<AtomicBool>,
    epoch: u64,
    current: Arc<AtomicU64>,
    driver: Option<JoinHandle<bool>>,
}

impl PlaybackHandle {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn events(&self) -> &Receiver<PlaybackEvent> {
        &self.events
    }

    pub fn try_next(&self) -> Option<PlaybackEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_finished() && self.current.load(Ordering::Acquire) != self.epoch
    }

    /// Cancels this playback if it is still the current one. A handle to an
    /// already superseded playback leaves the newer one running.
    pub fn cancel(&self) {
        if self
            .current
            .compare_exchange(self.epoch, self.epoch + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            debug!("playback {} cancelled", self.epoch);
        }
    }

    /// Blocks until the driver stops. Returns whether the playback completed.
    pub fn wait(&mut self) -> bool {
        match self.driver.take() {
            Some(driver) => driver.join().unwrap_or(false),
            None => self.is_finished(),
        }
    }
}
