//! Terminal event polling.
//!
//! A dedicated thread waits on crossterm and turns quiet periods into
//! `Redraw` ticks, so the UI refreshes even without input.

use std::sync::mpsc::{self, Receiver, RecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

#[derive(Debug)]
pub enum Event {
    /// Nothing happened for one redraw period.
    Redraw,
    Key(KeyEvent),
    /// Terminal resized to (width, height).
    Resize(u16, u16),
}

pub struct EventHandler {
    rx: Receiver<Event>,
}

impl EventHandler {
    /// Starts polling; a `Redraw` is emitted after each quiet `redraw` period.
    pub fn new(redraw: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let event = match event::poll(redraw) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    },
                    Ok(false) => Event::Redraw,
                    // Terminal gone; the receiver sees the disconnect.
                    Err(_) => break,
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Blocks until the next event. Errors once the polling thread has exited.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }
}
