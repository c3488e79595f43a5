// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! A thread-safe handle to a [CPU], for hosts which run the timers on their own thread.
//!
//! Every operation takes the lock for its whole duration, so a tick never
//! observes a half-applied key change or timer decrement.

use crate::{
    cpu::CPU,
    error::{Error, Result},
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// The 60 Hz timer period
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// A cloneable, thread-safe handle to a single [CPU]
#[derive(Clone, Debug, Default)]
pub struct Shared {
    cpu: Arc<Mutex<CPU>>,
}

impl Shared {
    /// Wraps a [CPU] for use across threads
    pub fn new(cpu: CPU) -> Self {
        Self {
            cpu: Arc::new(Mutex::new(cpu)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CPU>> {
        self.cpu.lock().map_err(|_| Error::Poisoned)
    }

    /// See [CPU::load_program]
    pub fn load_program(&self, rom: &[u8]) -> Result<()> {
        self.lock()?.load_program(rom)?;
        Ok(())
    }

    /// See [CPU::tick]
    pub fn tick(&self) -> Result<()> {
        self.lock()?.tick()?;
        Ok(())
    }

    /// Runs up to `steps` cycles under a single lock. See [CPU::multistep]
    pub fn multistep(&self, steps: usize) -> Result<()> {
        self.lock()?.multistep(steps)?;
        Ok(())
    }

    /// See [CPU::key_changed]
    pub fn key_changed(&self, key: usize, pressed: bool) -> Result<bool> {
        self.lock()?.key_changed(key, pressed)
    }

    /// See [CPU::decrement_timers]
    pub fn decrement_timers(&self) -> Result<bool> {
        Ok(self.lock()?.decrement_timers())
    }

    /// Runs `f` with shared access to the [CPU]
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// let shared = Shared::default();
    /// shared.load_program(&[0x6a, 0x05]).unwrap();
    /// shared.tick().unwrap();
    /// assert_eq!(5, shared.with(|cpu| cpu.v()[0xa]).unwrap());
    /// ```
    pub fn with<T>(&self, f: impl FnOnce(&CPU) -> T) -> Result<T> {
        Ok(f(&*self.lock()?))
    }

    /// Runs `f` with exclusive access to the [CPU]
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut CPU) -> T) -> Result<T> {
        Ok(f(&mut *self.lock()?))
    }

    /// Spawns a thread which calls [CPU::decrement_timers] once per `period`,
    /// and calls `on_beep` whenever a tone ends.
    ///
    /// The thread runs until the returned [TimerHandle] is stopped or dropped.
    /// # Examples
    /// ```rust
    /// # use chip8_interp::*;
    /// # use std::time::Duration;
    /// let shared = Shared::default();
    /// shared.load_program(&[0x60, 0x02, 0xf0, 0x18]).unwrap();
    /// shared.multistep(2).unwrap();
    /// let timer = shared.spawn_timer(Duration::from_millis(1), || {});
    /// std::thread::sleep(Duration::from_millis(50));
    /// assert_eq!(1, timer.stop().unwrap());
    /// assert_eq!(0, shared.with(|cpu| cpu.sound()).unwrap());
    /// ```
    pub fn spawn_timer(
        &self,
        period: Duration,
        mut on_beep: impl FnMut() + Send + 'static,
    ) -> TimerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let thread = {
            let (shared, stop) = (self.clone(), stop.clone());
            thread::spawn(move || {
                let mut beeps = 0;
                let mut next = Instant::now() + period;
                while !stop.load(Ordering::Relaxed) {
                    thread::sleep(next.saturating_duration_since(Instant::now()));
                    if shared.decrement_timers()? {
                        beeps += 1;
                        on_beep();
                    }
                    // a late tick doesn't make up for lost periods
                    next = (next + period).max(Instant::now());
                }
                Ok(beeps)
            })
        };
        TimerHandle {
            stop,
            thread: Some(thread),
        }
    }
}

impl From<CPU> for Shared {
    fn from(value: CPU) -> Self {
        Self::new(value)
    }
}

/// Controls a timer thread started by [Shared::spawn_timer]
#[derive(Debug)]
pub struct TimerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<usize>>>,
}

impl TimerHandle {
    /// Stops the timer thread, and returns the number of beeps it raised
    pub fn stop(mut self) -> Result<usize> {
        self.halt()
    }

    fn halt(&mut self) -> Result<usize> {
        self.stop.store(true, Ordering::Relaxed);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| Error::Poisoned)?,
            None => Ok(0),
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        let _ = self.halt();
    }
}
