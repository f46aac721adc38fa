//! Tick scheduling and the session driving loop.
//!
//! Everything that moves a session (clock ticks and user actions) arrives as a
//! [`DriverEvent`] on one stream and is applied in order by [`drive`]. A
//! [`Ticker`] produces the clock ticks from a background thread; dropping it
//! cancels the thread before returning, so no tick outlives the session that
//! owned it.

use crate::engine::{Session, SessionEvent};
use crate::Outcome;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Input to the driving loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverEvent {
    /// One second of wall-clock time passed
    Tick,
    /// The user finished the current strengthening exercise
    Validate,
    /// The user pauses or resumes the running countdown
    TogglePause,
    /// The user quits the session
    Stop,
}

/// Receives every event a session emits while it is driven
pub trait SessionObserver {
    fn on_event(&mut self, session: &Session, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&Session, &SessionEvent),
{
    fn on_event(&mut self, session: &Session, event: &SessionEvent) {
        self(session, event)
    }
}

/// Apply events to a session until it finishes or the stream ends
///
/// The observer first sees `ExerciseStarted` for the current exercise.
/// Returns the outcome, or `None` if the stream ran dry first.
pub fn drive<I, O>(session: &mut Session, events: I, observer: &mut O) -> Option<Outcome>
where
    I: IntoIterator<Item = DriverEvent>,
    O: SessionObserver + ?Sized,
{
    if session.is_finished() {
        return session.outcome();
    }

    observer.on_event(
        session,
        &SessionEvent::ExerciseStarted {
            index: session.current_exercise_index(),
        },
    );

    for event in events {
        let emitted = match event {
            DriverEvent::Tick => session.tick(),
            DriverEvent::Validate => match session.validate_exercise() {
                Ok(events) => events,
                Err(e) => {
                    tracing::debug!("Ignoring validation: {}", e);
                    Vec::new()
                }
            },
            DriverEvent::TogglePause => match session.toggle_countdown() {
                Ok(events) => events,
                Err(e) => {
                    tracing::debug!("Ignoring pause: {}", e);
                    Vec::new()
                }
            },
            DriverEvent::Stop => session.stop_session(),
        };

        for emitted_event in &emitted {
            observer.on_event(session, emitted_event);
        }

        if session.is_finished() {
            break;
        }
    }

    session.outcome()
}

/// Periodic tick source running on its own thread
///
/// Only one ticker should feed a session. Cancellation is immediate: the
/// thread waits on a cancel channel rather than sleeping.
pub struct Ticker {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Send `DriverEvent::Tick` to `sink` every `period` until cancelled
    pub fn start(period: Duration, sink: Sender<DriverEvent>) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match cancel_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if sink.send(DriverEvent::Tick).is_err() {
                        tracing::debug!("Tick receiver gone, ticker exiting");
                        break;
                    }
                }
                // Explicit cancel or the Ticker was dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// One tick per second
    pub fn every_second(sink: Sender<DriverEvent>) -> Self {
        Self::start(Duration::from_secs(1), sink)
    }

    /// Stop ticking and wait for the thread to exit
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Ticker thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
