//! Menu state, key handling, and rendering

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::sync::{Arc, Mutex};

use crate::device::Device;
use crate::lister::DeviceListResult;
use crate::menu::{EntryHandle, EntryKind, MenuCoordinator, MenuView, RefreshOutcome};
use crate::style::colors;
use crate::switcher::SwitchOutcome;

const KEY_HELP: &str = "↑/↓ select  Enter switch  r refresh  q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// Footer message
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Message {
    pub text: String,
    pub level: Level,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: Level::Info,
        }
    }

    pub fn for_switch(device: &Device, outcome: &SwitchOutcome) -> Self {
        match outcome {
            SwitchOutcome::Spawned { .. } => Self {
                text: format!("Switched to {}", device.label()),
                level: Level::Success,
            },
            SwitchOutcome::SpawnFailed(e) => Self {
                text: format!("Failed to switch to {} (ID: {}): {e}", device.label(), device.id),
                level: Level::Error,
            },
        }
    }

    fn color(&self) -> ratatui::style::Color {
        match self.level {
            Level::Info => colors::UI_SECONDARY,
            Level::Success => colors::UI_SUCCESS,
            Level::Warning => colors::UI_WARNING,
            Level::Error => colors::UI_ERROR,
        }
    }
}

pub(crate) struct App {
    coordinator: MenuCoordinator<MenuView>,
    last_switch: Arc<Mutex<Option<Message>>>,
    /// Position among the selectable entries
    selected: usize,
    message: Option<Message>,
    refresh_requested: bool,
    pub dirty: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        coordinator: MenuCoordinator<MenuView>,
        last_switch: Arc<Mutex<Option<Message>>>,
    ) -> Self {
        Self {
            coordinator,
            last_switch,
            selected: 0,
            message: None,
            refresh_requested: false,
            dirty: true,
            should_quit: false,
        }
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn set_message(&mut self, message: Message) {
        self.message = Some(message);
        self.dirty = true;
    }

    pub async fn refresh(&mut self) {
        let outcome = self.coordinator.refresh().await;
        self.after_refresh(&outcome);
    }

    fn after_refresh(&mut self, outcome: &RefreshOutcome) {
        self.message = match outcome {
            RefreshOutcome::Listed(DeviceListResult::Ok { skipped, .. }) if *skipped > 0 => {
                Some(Message {
                    text: format!("Skipped {skipped} malformed line(s)"),
                    level: Level::Warning,
                })
            }
            RefreshOutcome::Listed(DeviceListResult::CommandFailed(msg)) => Some(Message {
                text: msg.clone(),
                level: Level::Error,
            }),
            RefreshOutcome::Unresolved(msg) => Some(Message {
                text: msg.clone(),
                level: Level::Error,
            }),
            RefreshOutcome::Listed(_) => None,
        };

        let count = self.selectable_handles().len();
        self.selected = self.selected.min(count.saturating_sub(1));
        self.dirty = true;
    }

    fn view(&self) -> &MenuView {
        self.coordinator.host()
    }

    fn selectable_handles(&self) -> Vec<EntryHandle> {
        self.view()
            .entries()
            .iter()
            .filter(|e| e.kind == EntryKind::Selectable)
            .map(|e| e.handle)
            .collect()
    }

    fn selected_handle(&self) -> Option<EntryHandle> {
        self.selectable_handles().get(self.selected).copied()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let count = self.selectable_handles().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::F(5) => self.request_refresh(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = count.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_selected(),
            _ => return,
        }
        self.dirty = true;
    }

    fn activate_selected(&mut self) {
        let Some(handle) = self.selected_handle() else {
            return;
        };

        if self.view().activate(handle) {
            let notice = self.last_switch.lock().ok().and_then(|mut last| last.take());
            if let Some(notice) = notice {
                self.message = Some(notice);
            }
        }
    }
}

/// Draw the menu and footer
pub(crate) fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.area());

    let selected = app.selected_handle();
    let width = chunks[0].width.saturating_sub(4) as usize;
    let mut state = ListState::default();

    let items: Vec<ListItem> = app
        .view()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            if Some(entry.handle) == selected {
                state.select(Some(i));
            }
            let line = match entry.kind {
                EntryKind::Separator => Line::styled(
                    "─".repeat(width),
                    Style::default().fg(colors::UI_SECONDARY),
                ),
                EntryKind::Selectable => Line::from(Span::styled(
                    entry.text.clone(),
                    Style::default().fg(colors::UI_TEXT),
                )),
                EntryKind::Text { .. } if i == 0 => Line::styled(
                    entry.text.clone(),
                    Style::default()
                        .fg(colors::UI_HEADER)
                        .add_modifier(Modifier::BOLD),
                ),
                EntryKind::Text { .. } => Line::styled(
                    entry.text.clone(),
                    Style::default()
                        .fg(colors::UI_SECONDARY)
                        .add_modifier(Modifier::ITALIC),
                ),
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" outsw "))
        .highlight_style(
            Style::default()
                .fg(colors::UI_SELECTED)
                .bg(colors::UI_SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let footer = match &app.message {
        Some(message) => Line::from(vec![
            Span::styled(message.text.clone(), Style::default().fg(message.color())),
            Span::raw("  "),
            Span::styled(KEY_HELP, Style::default().fg(colors::UI_SECONDARY)),
        ]),
        None => Line::styled(KEY_HELP, Style::default().fg(colors::UI_SECONDARY)),
    };
    frame.render_widget(
        Paragraph::new(footer).block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );
}
