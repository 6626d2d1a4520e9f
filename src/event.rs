use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// What the main loop reacts to
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    /// A frame boundary; carries the instant the clock fired so the session
    /// advances by real elapsed time rather than by the nominal frame length
    Frame(Instant),
    Resize(u16, u16),
}

type Sender = mpsc::UnboundedSender<Event>;

/// Terminal input plus a frame clock, merged into one channel.
///
/// Input comes from crossterm's async `EventStream`, so no runtime worker is
/// parked in a blocking read.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: Sender,
    stop: Arc<AtomicBool>,
}

impl EventHandler {
    pub fn new(frame: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        spawn_input(tx.clone(), stop.clone());
        spawn_frame_clock(tx.clone(), stop.clone(), frame);

        Self { rx, _tx: tx, stop }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Ask both background tasks to wind down. The input task notices on
    /// its next terminal event.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn spawn_input(tx: Sender, stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(next) = reader.next().await {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let event = match next {
                // Release/repeat events would double every keystroke on Windows
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Event::Key(key)
                }
                Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                Ok(_) => continue,
                Err(e) => {
                    debug!("Terminal input closed: {e}");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    });
}

/// Emit `Event::Frame` every `frame` until stopped or the receiver is gone.
/// Late frames are skipped, not bunched up.
fn spawn_frame_clock(tx: Sender, stop: Arc<AtomicBool>, frame: Duration) {
    let frame = frame.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            let at = interval.tick().await;
            if stop.load(Ordering::Relaxed) {
                return;
            }
            if tx.send(Event::Frame(at.into_std())).is_err() {
                return;
            }
        }
    });
}
