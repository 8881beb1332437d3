//! Interactive terminal front-end.
//!
//! The main loop draws the current screen, waits up to 100 ms for a key and
//! hands it to [`App`]. Commands that talk to Cloudflare get one extra frame
//! with a busy indicator before they run.

#![forbid(unsafe_code)]

use std::time::Duration;

use cf_dns_edit_lib::Connect;
use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};

pub(crate) mod app;
mod terminal;
pub(crate) mod view;

pub use app::App;

use terminal::Term;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the editor until the user exits.
pub async fn run<C: Connect>(mut app: App<C>) -> Result<()> {
    let mut terminal = terminal::init()?;
    let result = event_loop(&mut terminal, &mut app).await;
    terminal::restore(&mut terminal)?;
    info!("Editor closed");
    result
}

async fn event_loop<C: Connect>(terminal: &mut Term, app: &mut App<C>) -> Result<()> {
    app.working = true;
    terminal.draw(|frame| view::render(app, frame))?;
    let started = app.nav.start().await;
    app.working = false;
    started?;
    app.sync();

    loop {
        terminal.draw(|frame| view::render(app, frame))?;

        if app.nav.is_exited() {
            return Ok(());
        }

        let Some(Event::Key(key)) = poll_event()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let Some(command) = app.handle_key(key) else {
            continue;
        };
        if command.is_remote() {
            app.working = true;
            terminal.draw(|frame| view::render(app, frame))?;
        }
        let result = app.execute(command).await;
        app.working = false;
        if let Err(e) = result {
            debug!("Fatal error from navigator: {e}");
            return Err(e.into());
        }
    }
}

fn poll_event() -> Result<Option<Event>> {
    if event::poll(POLL_INTERVAL)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
