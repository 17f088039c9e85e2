use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};

use ringmenu_tui::app::App;
use ringmenu_tui::events::{AppEvent, EventHandler};
use ringmenu_tui::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; silent unless RUST_LOG is set.
    env_logger::init();

    if let Err(e) = setup_terminal().await {
        eprintln!("Failed to setup terminal: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Force clear to trigger initial full render
    terminal.clear()?;

    let app = match terminal.size().map_err(anyhow::Error::from).and_then(App::new) {
        Ok(app) => app,
        Err(e) => {
            // Cleanup terminal before returning error
            cleanup_terminal(&mut terminal)?;
            return Err(e);
        }
    };

    let event_handler = EventHandler::new(app.frame_duration_ms());

    let res = run_app(&mut terminal, app, event_handler).await;

    // Always cleanup terminal
    cleanup_terminal(&mut terminal)?;

    res
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut event_handler: EventHandler,
) -> Result<()> {
    terminal.draw(|f| ui::render(f, &app))?;
    io::stdout().flush()?;

    let mut needs_clear = false;

    loop {
        let event = event_handler.next().await;

        if needs_clear {
            terminal.clear()?;
            needs_clear = false;
        }

        let should_continue = match event {
            AppEvent::Input(crossterm_event) => {
                if matches!(crossterm_event, CrosstermEvent::Resize(_, _)) {
                    needs_clear = true;
                }
                app.handle_event(crossterm_event)?
            }
            AppEvent::Frame => app.on_frame(),
        };

        if !should_continue {
            log::info!("exiting");
            break;
        }

        terminal.draw(|f| ui::render(f, &app))?;
        io::stdout().flush()?;
    }

    Ok(())
}
