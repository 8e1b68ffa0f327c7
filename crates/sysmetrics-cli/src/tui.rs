use std::io;

use crossterm::event::{self, Event};
use ratatui::Frame;

/// A full-screen terminal application driven by [`run`].
pub(crate) trait App {
    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, event: &Event);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);
}

/// Runs `app` until it asks to exit, redrawing after every terminal event.
///
/// The terminal is restored on return, also on error.
pub(crate) fn run<A>(app: &mut A) -> io::Result<()>
where
    A: App,
{
    ratatui::run(|terminal| {
        while !app.should_exit() {
            terminal.draw(|f| app.draw(f))?;
            let event = event::read()?;
            app.handle_event(&event);
        }
        Ok(())
    })
}
