//! Interactive terminal form.

pub mod input;
pub mod state;
pub mod view;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};

use crate::config::FormDefaults;
use crate::form::Session;

pub use input::{Action, map_key};
pub use state::{App, Field, Status};

/// Run the form until the user quits.
///
/// The terminal is restored even when the event loop fails.
pub fn run(session: &Session, defaults: &FormDefaults) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(session, defaults);
    tracing::info!("form started");
    let result = event_loop(&mut terminal, &mut app, session);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("form closed");
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &Session,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| view::draw(f, app, session))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.apply(map_key(key), session);
            }
        }
    }
    Ok(())
}
