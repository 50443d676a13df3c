//! The countdown timers of the chip.
//!
//! A [`Timer`](Timer) pairs an 8-bit countdown value with a background
//! ticker thread that decrements it on a fixed period (60Hz per the spec).
//! The value is shared between the instruction loop (`Fx07`/`Fx15`/`Fx18`)
//! and the ticker, so every access goes through one mutex per timer
//! instance.
use std::{
    sync::{
        mpsc::{self, RecvTimeoutError, SyncSender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// The transition handler of a timer.
///
/// `start` fires exactly once when the value goes from zero to nonzero,
/// `stop` exactly once when it drops back to zero. The sound timer hands
/// the buzzer in here, the delay timer runs with [`NoCallback`](NoCallback).
pub trait TimerCallback: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// The no-op handler used where no transition notifications are wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

/// The two states a timer can be in. Notifications fire only on the
/// transition between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
}

struct State<C> {
    value: u8,
    phase: Phase,
    callback: C,
}

/// An 8-bit countdown register decremented by a background schedule.
pub struct Timer<C: TimerCallback + 'static> {
    state: Arc<Mutex<State<C>>>,
    _ticker: Ticker,
}

impl Timer<NoCallback> {
    /// A timer without transition notifications.
    pub fn new(interval: Duration) -> Self {
        Self::with_callback(interval, NoCallback)
    }
}

impl<C: TimerCallback + 'static> Timer<C> {
    /// A timer that notifies `callback` on its zero/nonzero transitions.
    ///
    /// The countdown starts at zero with the schedule already running.
    pub fn with_callback(interval: Duration, callback: C) -> Self {
        let state = Arc::new(Mutex::new(State {
            value: 0,
            phase: Phase::Idle,
            callback,
        }));

        let shared = state.clone();
        let mut ticker = Ticker::new();
        ticker.start(move || Self::tick(&shared), interval);

        Self {
            state,
            _ticker: ticker,
        }
    }

    /// One scheduled tick, decrements a nonzero value by one.
    fn tick(state: &Mutex<State<C>>) {
        let mut state = state.lock();
        if state.value == 0 {
            return;
        }
        state.value -= 1;
        if state.value == 0 && state.phase == Phase::Running {
            state.phase = Phase::Idle;
            state.callback.stop();
        }
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.state.lock().value
    }

    /// Will set the value from which the timer shall count down.
    ///
    /// Repeated sets while the value stays nonzero fire no notification.
    pub fn set_value(&mut self, value: u8) {
        let mut state = self.state.lock();
        state.value = value;
        match (state.phase, value) {
            (Phase::Idle, 1..=u8::MAX) => {
                state.phase = Phase::Running;
                state.callback.start();
            }
            (Phase::Running, 0) => {
                state.phase = Phase::Idle;
                state.callback.stop();
            }
            _ => {}
        }
    }
}

/// The background thread running a callback on a fixed period until it is
/// told to shut down.
struct Ticker {
    thread: Option<JoinHandle<()>>,
    shutdown: Option<SyncSender<()>>,
}

impl Ticker {
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
        }
    }

    /// Spawns the thread. The interval is corrected by the time the tick
    /// itself took, assuming a tick always finishes within one period.
    fn start<F>(&mut self, mut tick: F, interval: Duration)
    where
        F: FnMut() + Send + 'static,
    {
        let (send, recv) = mpsc::sync_channel::<()>(1);
        let thread = thread::spawn(move || {
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let begin = Instant::now();
                        tick();
                        timeout = interval.saturating_sub(begin.elapsed());
                    }
                    // both an explicit message and a dropped sender mean
                    // shutdown
                    Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    fn stop(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            // the thread may have exited already, nothing to do then
            let _ = sender.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// counts the fired notifications, so tests can assert on exactly-once
    #[derive(Default, Clone)]
    struct Counting {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl TimerCallback for Counting {
        fn start(&mut self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// an interval long enough that the background schedule never fires
    /// within a test run
    const STALLED: Duration = Duration::from_secs(3600);

    #[test]
    fn test_counts_down_to_zero() {
        let counting = Counting::default();
        let mut timer = Timer::with_callback(Duration::from_millis(2), counting.clone());

        timer.set_value(5);
        thread::sleep(Duration::from_millis(100));

        assert_eq!(timer.get_value(), 0);
        assert_eq!(counting.starts.load(Ordering::SeqCst), 1);
        assert_eq!(counting.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_fires_start_once() {
        let counting = Counting::default();
        let mut timer = Timer::with_callback(STALLED, counting.clone());

        timer.set_value(5);
        assert_eq!(counting.starts.load(Ordering::SeqCst), 1);

        // still running, no further notifications
        timer.set_value(3);
        timer.set_value(7);
        assert_eq!(counting.starts.load(Ordering::SeqCst), 1);
        assert_eq!(counting.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_to_zero_fires_stop_once() {
        let counting = Counting::default();
        let mut timer = Timer::with_callback(STALLED, counting.clone());

        timer.set_value(5);
        timer.set_value(0);
        assert_eq!(counting.stops.load(Ordering::SeqCst), 1);

        // already idle, setting zero again is not a transition
        timer.set_value(0);
        assert_eq!(counting.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_idle_timer_stays_at_zero() {
        let timer = Timer::new(Duration::from_millis(2));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(timer.get_value(), 0);
    }
}
