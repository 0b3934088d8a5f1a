//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{AppState, Tab};

/// Step applied by `+` / `-` to the refresh interval.
const INTERVAL_STEP_MS: u32 = 1_000;

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Ask the sampler for a new interval (not yet validated).
    SetInterval(u32),
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let current_ms = u32::try_from(state.interval.as_millis()).unwrap_or(u32::MAX);
    let page = state.page_size.max(1);

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,

        KeyCode::Char('1') => {
            state.current_tab = Tab::Metrics;
            KeyAction::None
        }
        KeyCode::Char('2') => {
            state.current_tab = Tab::Graphs;
            KeyAction::None
        }
        KeyCode::Tab | KeyCode::BackTab => {
            state.current_tab = state.current_tab.next();
            KeyAction::None
        }

        KeyCode::Char('+') | KeyCode::Char('=') => {
            KeyAction::SetInterval(current_ms.saturating_add(INTERVAL_STEP_MS))
        }
        KeyCode::Char('-') => KeyAction::SetInterval(current_ms.saturating_sub(INTERVAL_STEP_MS)),

        code if state.current_tab == Tab::Metrics => {
            match code {
                KeyCode::Up | KeyCode::Char('k') => state.scroll_up(1),
                KeyCode::Down | KeyCode::Char('j') => state.scroll_down(1),
                KeyCode::PageUp => state.scroll_up(page),
                KeyCode::PageDown => state.scroll_down(page),
                KeyCode::Home => state.scroll_home(),
                KeyCode::End => state.scroll_end(),
                _ => {}
            }
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{HostSample, MetricsSnapshot, ProcessInfo};
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn state_with_processes(count: u32) -> AppState {
        let mut state = AppState::new(Duration::from_secs(2));
        state.page_size = 4;
        state.apply_snapshot(Arc::new(MetricsSnapshot {
            sequence: 1,
            sample: Some(HostSample {
                processes: (1..=count).map(|pid| ProcessInfo::new(pid, "p", 0)).collect(),
                ..Default::default()
            }),
            ..Default::default()
        }));
        state
    }

    #[test]
    fn quit_keys() {
        let mut state = AppState::new(Duration::from_secs(2));
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyAction::Quit);

        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(handle_key(&mut state, ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn number_keys_and_tab_switch_tabs() {
        let mut state = AppState::new(Duration::from_secs(2));
        handle_key(&mut state, key(KeyCode::Char('2')));
        assert_eq!(state.current_tab, Tab::Graphs);
        handle_key(&mut state, key(KeyCode::Char('1')));
        assert_eq!(state.current_tab, Tab::Metrics);
        handle_key(&mut state, key(KeyCode::Tab));
        assert_eq!(state.current_tab, Tab::Graphs);
    }

    #[test]
    fn plus_minus_request_interval_change() {
        let mut state = AppState::new(Duration::from_secs(2));
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('+'))),
            KeyAction::SetInterval(3_000)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('-'))),
            KeyAction::SetInterval(1_000)
        );
        // The request itself never changes the state; the sampler decides.
        assert_eq!(state.interval, Duration::from_secs(2));
    }

    #[test]
    fn minus_below_minimum_is_still_requested() {
        let mut state = AppState::new(Duration::from_secs(1));
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('-'))),
            KeyAction::SetInterval(0)
        );
    }

    #[test]
    fn arrows_scroll_process_table() {
        let mut state = state_with_processes(10);
        handle_key(&mut state, key(KeyCode::Down));
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.process_scroll, 2);
        handle_key(&mut state, key(KeyCode::PageDown));
        assert_eq!(state.process_scroll, 6);
        handle_key(&mut state, key(KeyCode::Up));
        assert_eq!(state.process_scroll, 5);
        handle_key(&mut state, key(KeyCode::Home));
        assert_eq!(state.process_scroll, 0);
        handle_key(&mut state, key(KeyCode::End));
        assert_eq!(state.process_scroll, 6);
    }

    #[test]
    fn scrolling_ignored_on_graphs_tab() {
        let mut state = state_with_processes(10);
        state.current_tab = Tab::Graphs;
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.process_scroll, 0);
    }
}
