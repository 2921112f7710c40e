use std::thread::sleep;

use crossterm::event::Event;
use tracing::{debug, info};

use snake::engine::{GameEngine, GameEvent, SessionState, TickResult};
use snake::error::{GameError, Result};
use snake::highscore::HighScoreStore;
use snake::input::{command_for_gesture, command_for_key, Command, SwipeTracker};
use snake::scheduler::FixedStepScheduler;
use snake::{Coords, GameConfig};

use crate::term::{TermCoords, TermInt, TermManager};

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHARS: [char; 2] = ['(', ')'];
const DEAD_SNAKE_CHAR: char = 'X';

/// Board frame sits below the one-line HUD.
const BOARD_ORIGIN: TermCoords = (0, 1);

#[derive(PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct SnakeGame {
    term: TermManager,
    engine: GameEngine,
    scheduler: FixedStepScheduler,
    swipes: SwipeTracker,
    sound_enabled: bool,
    drawn: Vec<Coords>,
}

impl SnakeGame {
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Result<Self> {
        let scheduler = FixedStepScheduler::new(config.frames_per_tick, config.frame_interval());
        let sound_enabled = config.sound_enabled;
        let engine = GameEngine::new(config, store)?;
        info!(tick_interval = ?scheduler.tick_interval(), "engine ready");

        let term = TermManager::new()?;
        let (need_w, need_h) = board_term_size(&engine);
        let (have_w, have_h) = term.size();
        if have_w < need_w || have_h < need_h {
            return Err(GameError::TerminalTooSmall { need_w, need_h, have_w, have_h });
        }

        Ok(SnakeGame { term, engine, scheduler, swipes: SwipeTracker::new(), sound_enabled, drawn: vec![] })
    }

    /// Plays until the user quits, restoring the terminal on the way out.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let res = self.play();
        let restored = self.term.restore();
        res.and(restored)
    }

    fn play(&mut self) -> Result<()> {
        self.term.clear()?;
        let (w, h) = board_term_size(&self.engine);
        self.term.draw_borders(BOARD_ORIGIN, w - 2, h - 3)?;
        self.draw_hud()?;
        self.render_board()?;
        self.show_intro()?;

        loop {
            sleep(self.scheduler.frame_interval());

            for ev in self.term.read_events_queue()? {
                if self.handle_event(ev)? == Flow::Quit {
                    return Ok(());
                }
            }

            if self.engine.state() != SessionState::Running || !self.scheduler.frame() {
                continue;
            }

            let result = self.engine.advance();
            self.on_tick(result)?;
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn handle_event(&mut self, ev: Event) -> Result<Flow> {
        match ev {
            Event::Key(key) => match command_for_key(&key) {
                Some(cmd) => self.apply(cmd),
                None => Ok(Flow::Continue),
            },
            Event::Mouse(mouse) => {
                match self.swipes.handle(&mouse) {
                    Some(gesture) => {
                        let playing = matches!(self.engine.state(), SessionState::Running | SessionState::Paused);
                        self.apply(command_for_gesture(gesture, playing))
                    }
                    None => Ok(Flow::Continue),
                }
            }
            Event::Resize(..) => Ok(Flow::Continue),
        }
    }

    fn apply(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::Turn(dir) => {
                let accepted = self.engine.request_direction_change(dir);
                debug!(?dir, accepted, "turn requested");
            }
            Command::StartOrPause => match self.engine.state() {
                SessionState::NotStarted | SessionState::GameOver => self.start_session()?,
                SessionState::Running | SessionState::Paused => self.toggle_pause()?,
            },
            Command::Pause => self.toggle_pause()?,
            Command::Reset => self.start_session()?,
            Command::ToggleSound => {
                self.sound_enabled = !self.sound_enabled;
                info!(enabled = self.sound_enabled, "sound toggled");
                self.draw_hud()?;
                self.term.flush()?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn start_session(&mut self) -> Result<()> {
        self.engine.reset();
        self.scheduler.reset();
        self.engine.take_events();
        self.term.hide_message()?;
        self.render_board()?;
        self.draw_hud()?;
        self.term.flush()
    }

    fn toggle_pause(&mut self) -> Result<()> {
        self.engine.toggle_pause();
        match self.engine.state() {
            SessionState::Paused => self.term.show_message(&["Paused", "Press Space or Esc to resume", "or Q to quit"]),
            _ => self.term.hide_message(),
        }
    }

    fn on_tick(&mut self, result: TickResult) -> Result<()> {
        self.render_board()?;

        let mut hud_dirty = false;
        for event in self.engine.take_events() {
            match event {
                GameEvent::ScoreChanged { .. } | GameEvent::HighScoreChanged { .. } => hud_dirty = true,
                GameEvent::FoodEaten { at } => debug!(?at, "food eaten"),
                GameEvent::GameOver { .. } | GameEvent::BoardFilled { .. } => {}
            }
        }
        if hud_dirty {
            self.draw_hud()?;
        }

        if self.sound_enabled && (result.ate_food || result.collided) {
            self.term.beep()?;
        }

        if result.board_filled {
            self.game_over(result.score, true)?;
        } else if result.collided {
            self.game_over(result.score, false)?;
        }

        self.term.flush()
    }

    fn show_intro(&mut self) -> Result<()> {
        self.term.show_message(&[
            "SNAKE",
            "",
            "Arrow keys or WASD to move",
            "Space to start or pause",
            "R to restart, M to toggle sound",
            "Q or CTRL+C to quit",
            "",
            "Press Space to begin",
        ])
    }

    fn game_over(&mut self, score: u64, win: bool) -> Result<()> {
        let title = if win {"You won!"} else {"Game over!"};

        if !win {
            let body: Vec<Coords> = self.engine.snake().body().iter().copied().collect();
            for pos in body {
                self.print_cell(pos, [DEAD_SNAKE_CHAR; 2])?;
            }
        }

        self.term.show_message(&[
            title,
            &*format!("Score: {}", score),
            &*format!("Best: {}", self.engine.high_score()),
            "",
            "Press Space to play again,",
            "or Q to quit."
        ])
    }

    fn render_board(&mut self) -> Result<()> {
        for pos in std::mem::take(&mut self.drawn) {
            self.print_cell(pos, [' '; 2])?;
        }

        let food = self.engine.food();
        self.print_cell(food, APPLE_CHARS)?;
        self.drawn.push(food);

        let head_char = self.engine.snake().head_char();
        let body: Vec<Coords> = self.engine.snake().body().iter().copied().collect();
        for (i, pos) in body.into_iter().enumerate().rev() {
            let ch = if i == 0 {head_char} else {SNAKE_BODY_CHAR};
            self.print_cell(pos, [ch; 2])?;
            self.drawn.push(pos);
        }

        Ok(())
    }

    fn draw_hud(&mut self) -> Result<()> {
        let (w, _) = board_term_size(&self.engine);
        let line = format!(
            "Score: {}  Best: {}  Length: {}  Sound: {}",
            self.engine.score(),
            self.engine.high_score(),
            self.engine.length(),
            if self.sound_enabled {"on"} else {"off"},
        );
        let padded = format!("{:<width$}", line, width = w as usize);
        self.term.print_str_at((0, 0), &padded)
    }

    fn print_cell(&mut self, pos: Coords, chars: [char; 2]) -> Result<()> {
        let grid = self.engine.config().grid_size;
        let x = BOARD_ORIGIN.0 + 1 + (pos.0 / grid) as TermInt * 2;
        let y = BOARD_ORIGIN.1 + 1 + (pos.1 / grid) as TermInt;
        self.term.print_at((x, y), chars[0])?;
        self.term.print_at((x + 1, y), chars[1])
    }
}

/// Terminal columns and rows needed for HUD, frame and board.
fn board_term_size(engine: &GameEngine) -> TermCoords {
    let config = engine.config();
    ((config.board_width * 2 + 2) as TermInt, (config.board_height + 3) as TermInt)
}
