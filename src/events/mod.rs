use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

pub enum AppEvent {
    Input(Event),
    /// Time to advance the menus by one frame.
    Frame,
}

pub struct EventHandler {
    event_stream: EventStream,
    frame_interval: Interval,
}

impl EventHandler {
    pub fn new(frame_ms: u64) -> Self {
        let mut frame_interval = interval(Duration::from_millis(frame_ms.max(1)));
        // A slow terminal drops frames instead of replaying them in a burst.
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            event_stream: EventStream::new(),
            frame_interval,
        }
    }

    pub async fn next(&mut self) -> AppEvent {
        tokio::select! {
            _ = self.frame_interval.tick() => AppEvent::Frame,
            event = self.event_stream.next() => {
                match event {
                    Some(Ok(evt)) => AppEvent::Input(evt),
                    _ => AppEvent::Frame, // Fallback to a frame on error or None
                }
            }
        }
    }
}
