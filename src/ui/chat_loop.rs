//! Main chat event loop and terminal lifecycle.
//!
//! A single cooperative loop owns every mutation of shared state: it polls
//! keyboard and mouse events, advances the greeting animation on its tick
//! interval, and drains settled completion outcomes from the service
//! channel. Request tasks run on the runtime's worker threads and only
//! re-enter through that channel.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::core::app::{App, Endpoint};
use crate::core::completion::{CompletionOutcome, CompletionService, TracingSink};
use crate::core::greeting::TICK_INTERVAL;
use crate::ui::renderer::ui;

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lines under the message area: input box plus its borders.
const INPUT_AREA_HEIGHT: u16 = 3;

pub async fn run_chat(
    endpoint: Endpoint,
    greeting_text: String,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(endpoint, &greeting_text);
    let (service, mut rx) = CompletionService::new(Arc::new(TracingSink));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, &service, &mut rx).await;

    // Restore the terminal on every exit path.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    service: &CompletionService,
    rx: &mut mpsc::UnboundedReceiver<(CompletionOutcome, u64)>,
) -> Result<(), Box<dyn Error>> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        // Greeting animation runs on its own cadence, independent of how
        // often we redraw.
        if last_tick.elapsed() >= TICK_INTERVAL {
            if app.show_greeting() && app.greeting.is_animating() {
                app.greeting.tick();
            }
            last_tick = Instant::now();
        }

        if event::poll(EVENT_POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Enter => {
                        let params = app.submit();
                        service.spawn_request(params);
                    }
                    KeyCode::Char(c) => {
                        app.note_input_interaction();
                        app.input.push(c);
                    }
                    KeyCode::Backspace => {
                        app.note_input_interaction();
                        app.input.pop();
                    }
                    KeyCode::Up => {
                        app.scroll_up(1, message_area_height(terminal));
                    }
                    KeyCode::Down => {
                        app.scroll_down(1, message_area_height(terminal));
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.scroll_up(3, message_area_height(terminal));
                    }
                    MouseEventKind::ScrollDown => {
                        app.scroll_down(3, message_area_height(terminal));
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Settled completions re-enter here and nowhere else.
        while let Ok((outcome, _request_id)) = rx.try_recv() {
            app.apply_outcome(outcome);
        }
    }
}

fn message_area_height(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> u16 {
    let terminal_height = terminal.size().map(|size| size.height).unwrap_or_default();
    terminal_height
        .saturating_sub(INPUT_AREA_HEIGHT)
        .saturating_sub(1)
}
