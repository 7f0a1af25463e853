use std::io::{self, Stdout};

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, error, info};

use crate::app::{App, Flow};
use crate::clock::FrameClock;
use crate::event::InputSource;
use crate::surface::{TerminalSurface, Viewport};

pub trait Screen {
    /// Where the canvas landed on the last present.
    fn viewport(&self) -> Viewport;
    fn present(&mut self, app: &App) -> io::Result<()>;
}

pub struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    viewport: Viewport,
    keyboard_enhanced: bool,
}

impl TerminalScreen {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if keyboard_enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        let viewport = Viewport::new(terminal.get_frame().area());
        debug!(keyboard_enhanced, "terminal ready");
        Ok(Self {
            terminal,
            viewport,
            keyboard_enhanced,
        })
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()
    }
}

impl Screen for TerminalScreen {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn present(&mut self, app: &App) -> io::Result<()> {
        let mut viewport = self.viewport;
        self.terminal.draw(|frame| {
            viewport = Viewport::new(frame.area());
            let mut surface = TerminalSurface::new(frame.buffer_mut(), viewport);
            app.draw(&mut surface);
        })?;
        self.viewport = viewport;
        Ok(())
    }
}

/// Runs frames until the app asks to quit. Returns the number of frames drawn.
pub fn run(
    app: &mut App,
    clock: &mut FrameClock,
    input: &mut dyn InputSource,
    screen: &mut dyn Screen,
) -> io::Result<u64> {
    let mut frames = 0u64;
    info!(game = app.session().title(), "main loop started");
    loop {
        let dt = clock.tick();
        let snapshot = input.poll(&screen.viewport())?;
        if app.step(dt, &snapshot) == Flow::Quit {
            break;
        }
        screen.present(app)?;
        frames += 1;
    }
    info!(frames, "main loop finished");
    Ok(frames)
}

/// Fold terminal restoration into the loop result. A loop error is never
/// hidden by a restore failure.
pub fn finish(result: io::Result<u64>, restored: io::Result<()>) -> io::Result<u64> {
    match (result, restored) {
        (Ok(frames), Ok(())) => Ok(frames),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore)) => {
            error!(error = %restore, "terminal restore failed");
            Err(e)
        }
    }
}
