//! Terminal User Interface (TUI) for outsw
//!
//! Interactive host for the device menu: the coordinator renders into a
//! [`MenuView`](crate::menu::MenuView) and this module draws it with ratatui.

use color_eyre::eyre::{Context, Result};
use crossterm::cursor::Show;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::{Arc, Mutex};

use crate::commands;
use crate::config::Config;
use crate::device::Device;
use crate::menu::{MenuCoordinator, MenuView, SwitchHook};
use crate::switcher::SwitchOutcome;

mod app;

use app::{App, Message};

/// Run the terminal menu
///
/// # Errors
/// Returns an error if terminal initialization or drawing fails.
pub async fn run(config: Config) -> Result<()> {
    // Restore the terminal before the panic report is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        original_hook(info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        }
    }
    let _term_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let last_switch: Arc<Mutex<Option<Message>>> = Arc::default();
    let coordinator = MenuCoordinator::new(
        MenuView::new(),
        config.lister(),
        config.switcher(),
        config.script_location(),
    )
    .with_switch_hook(switch_hook(&config, Arc::clone(&last_switch)));

    let mut app = App::new(coordinator, last_switch);
    let result = run_app(&mut terminal, &mut app).await;

    terminal.show_cursor().context("Failed to show cursor")?;
    result
}

/// Record the switch result for the footer (and notify, if enabled)
fn switch_hook(config: &Config, slot: Arc<Mutex<Option<Message>>>) -> SwitchHook {
    let notify = commands::switch_hook(config);
    Arc::new(move |device: &Device, outcome: &SwitchOutcome| {
        if let Some(notify) = &notify {
            notify(device, outcome);
        }
        if let Ok(mut last) = slot.lock() {
            *last = Some(Message::for_switch(device, outcome));
        }
    })
}

/// Main event loop
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    app.request_refresh();

    loop {
        if app.take_refresh_request() {
            // Show the pending state before blocking on the enumeration command
            app.set_message(Message::info("Refreshing..."));
            terminal
                .draw(|frame| app::render(frame, app))
                .context("Failed to draw")?;
            app.refresh().await;
        }

        if app.dirty {
            terminal
                .draw(|frame| app::render(frame, app))
                .context("Failed to draw")?;
            app.dirty = false;
        }

        if app.should_quit {
            return Ok(());
        }

        match events.next().await {
            Some(Ok(Event::Key(key))) => app.handle_key(key),
            Some(Ok(Event::Resize(..))) => app.dirty = true,
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
            None => return Ok(()),
        }
    }
}
