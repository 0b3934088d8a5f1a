//! Main TUI application.

use std::io;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::publisher::Subscription;
use crate::sampler::SamplerHandle;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::{AppState, StatusKind};

/// Main TUI application, a read-only consumer of a running sampler.
pub struct App {
    handle: SamplerHandle,
    events: Subscription,
    state: AppState,
    should_quit: bool,
}

impl App {
    /// Subscribes to the sampler. Events published before this call are not shown.
    pub fn new(handle: SamplerHandle) -> Self {
        let state = AppState::new(handle.interval());
        Self {
            events: handle.subscribe(),
            handle,
            state,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Runs the TUI until the user quits. Redraws at least every `redraw`.
    pub fn run(mut self, redraw: Duration) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, redraw);

        // Restore the terminal even when the loop failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        redraw: Duration,
    ) -> io::Result<()> {
        let events = EventHandler::new(redraw);

        loop {
            self.refresh();
            terminal.draw(|frame| render(frame, &mut self.state))?;

            match events.next() {
                Ok(Event::Redraw) | Ok(Event::Resize(..)) => {}
                Ok(Event::Key(key)) => {
                    let action = handle_key(&mut self.state, key);
                    self.apply(action);
                }
                Err(_) => self.should_quit = true,
            }

            if self.should_quit {
                debug!("tui quit requested");
                return Ok(());
            }
        }
    }

    /// Pulls pending sampler events and the latest snapshot into the state.
    pub fn refresh(&mut self) {
        while let Some(event) = self.events.try_recv() {
            self.state.apply_event(&event);
        }
        self.state.apply_snapshot(self.handle.latest());
        self.state.interval = self.handle.interval();
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::SetInterval(millis) => match self.handle.set_interval(millis) {
                Ok(()) => self.state.interval_changed(self.handle.interval()),
                Err(e) => self.state.set_status(StatusKind::Error, e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ScriptedProbe;
    use crate::sampler::{SamplerConfig, SamplerLoop};
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        let action = handle_key(&mut app.state, key(code));
        app.apply(action);
    }

    fn start(interval_ms: u32) -> SamplerHandle {
        SamplerLoop::new(ScriptedProbe::default(), SamplerConfig::new(interval_ms).unwrap())
            .start()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn plus_and_minus_go_through_the_sampler() {
        let handle = start(2_000);
        let mut app = App::new(handle.clone());

        press(&mut app, KeyCode::Char('+'));
        assert_eq!(handle.interval(), Duration::from_secs(3));
        assert_eq!(app.state().interval, Duration::from_secs(3));

        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(handle.interval(), Duration::from_secs(1));

        // Below the minimum: rejected, interval kept, error shown.
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(handle.interval(), Duration::from_secs(1));
        let status = app.state().status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("out of range"));

        handle.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn refresh_picks_up_published_snapshot() {
        let handle = start(60_000);
        let mut app = App::new(handle.clone());

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while app.state().snapshot.is_unstarted() && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.refresh();
        }
        assert_eq!(app.state().snapshot.sequence, 1);
        assert_eq!(app.state().process_count(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn quit_key_sets_flag() {
        let handle = start(60_000);
        let mut app = App::new(handle.clone());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        handle.shutdown().await;
    }
}
