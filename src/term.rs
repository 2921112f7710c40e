use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, EnableMouseCapture, DisableMouseCapture, read, poll};

use snake::error::{GameError, Result};

pub type TermInt = u16;
pub type TermCoords = (TermInt, TermInt);

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().map_err(GameError::terminal)?;
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture).map_err(GameError::terminal)?;
        terminal::enable_raw_mode().map_err(GameError::terminal)?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).map_err(GameError::terminal)
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().map_err(GameError::terminal)?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, DisableMouseCapture, LeaveAlternateScreen)
            .map_err(GameError::terminal)
    }

    /// Everything queued since the last call, without blocking.
    pub fn read_events_queue(&self) -> Result<Vec<Event>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0)).map_err(GameError::terminal)? {
            events.push(read().map_err(GameError::terminal)?);
        }

        Ok(events)
    }

    pub fn size(&self) -> TermCoords {
        (self.width, self.height)
    }

    /// Draws a frame whose interior is `width` x `height` starting at `origin`.
    pub fn draw_borders(&mut self, origin: TermCoords, width: TermInt, height: TermInt) -> Result<()> {
        let (x0, y0) = origin;
        let (end_x, end_y) = (x0 + width + 1, y0 + height + 1);

        for x in x0..=end_x {
            let ch = if x == x0 || x == end_x {'+'} else {'-'};
            self.print_at((x, y0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in y0 + 1..end_y {
            self.print_at((x0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Put back what the message covered
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(ch) = self.screen_char((x, y)) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        if let Some(idx) = self.index(pos) {
            self.screen[idx] = ch;
        }
        // Under an open message only the buffer changes
        if self.covered_by_message(pos) {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).map_err(GameError::terminal)
    }

    pub fn print_str_at(&mut self, pos: TermCoords, s: &str) -> Result<()> {
        for (i, ch) in s.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch)?;
        }
        Ok(())
    }

    /// Rings the terminal bell.
    pub fn beep(&mut self) -> Result<()> {
        queue!(self.stdout, style::Print('\x07')).map_err(GameError::terminal)
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).map_err(GameError::terminal)?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).map_err(GameError::terminal)
    }

    fn index(&self, pos: TermCoords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn screen_char(&self, pos: TermCoords) -> Option<char> {
        self.index(pos).map(|idx| self.screen[idx])
    }

    fn covered_by_message(&self, pos: TermCoords) -> bool {
        match &self.current_msg {
            Some(msg) => {
                pos.0 >= msg.top_left.0 && pos.0 < msg.top_left.0 + msg.width
                    && pos.1 >= msg.top_left.1 && pos.1 < msg.top_left.1 + msg.height
            }
            None => false,
        }
    }
}
