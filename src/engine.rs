//! The game state engine.
//!
//! One [`GameEngine`] owns the snake, the food, the score and the session
//! state. It is driven from outside: an input adapter calls
//! [`GameEngine::request_direction_change`] and the session controls, a
//! scheduler calls [`GameEngine::advance`] once per tick. Nothing here
//! blocks or performs I/O except the high-score store it is handed.
//!
//! ```text
//! NotStarted --start()--> Running
//! Running --pause()--> Paused --resume()--> Running
//! Running --(collision in advance())--> GameOver
//! GameOver --start()/reset()--> Running
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GameConfig};
use crate::food::{place_food, Grid};
use crate::highscore::HighScoreStore;
use crate::snake::{Bounds, Direction, Snake, Velocity};
use crate::Coords;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Outcome of one [`GameEngine::advance`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickResult {
    pub moved: bool,
    pub ate_food: bool,
    pub collided: bool,
    /// No free cell was left for the food; the session ended.
    pub board_filled: bool,
    pub score: u64,
    pub length: usize,
}

/// State-change notifications for presentation and audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    FoodEaten { at: Coords },
    ScoreChanged { score: u64 },
    HighScoreChanged { high_score: u64 },
    GameOver { score: u64 },
    BoardFilled { score: u64 },
}

pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    bounds: Bounds,
    state: SessionState,
    snake: Snake,
    food: Coords,
    pending: Option<Velocity>,
    score: u64,
    high_score: u64,
    store: Box<dyn HighScoreStore>,
    rng: StdRng,
    events: Vec<GameEvent>,
    ticks: u64,
}

impl GameEngine {
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Deterministic food placement, for tests and replays.
    pub fn with_seed(config: GameConfig, store: Box<dyn HighScoreStore>, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: Box<dyn HighScoreStore>, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let high_score = store.load().unwrap_or_else(|e| {
            warn!("high score unavailable, starting from 0: {}", e);
            0
        });

        let grid = Grid { width: config.board_width, height: config.board_height, size: config.grid_size };
        let snake = canonical_snake(&config);
        let start = snake.head();

        let mut engine = GameEngine {
            bounds: config.bounds(),
            grid,
            config,
            state: SessionState::NotStarted,
            snake,
            food: start,
            pending: None,
            score: 0,
            high_score,
            store,
            rng,
            events: Vec::new(),
            ticks: 0,
        };
        engine.init_session();
        Ok(engine)
    }

    pub fn start(&mut self) {
        self.reset();
    }

    /// Puts the canonical snake back, zeroes the score, places fresh food
    /// and starts running. Valid from any state.
    pub fn reset(&mut self) {
        self.init_session();
        self.state = SessionState::Running;
        self.events.push(GameEvent::ScoreChanged { score: 0 });
        info!(high_score = self.high_score, "session started");
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Paused;
            info!(tick = self.ticks, "paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Running;
            info!(tick = self.ticks, "resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Running => self.pause(),
            SessionState::Paused => self.resume(),
            SessionState::NotStarted | SessionState::GameOver => {}
        }
    }

    /// Buffers a turn for the next tick. Ignored unless running, and ignored
    /// when `dir` lies on the axis the snake is currently moving along.
    /// Returns whether the request was taken.
    pub fn request_direction_change(&mut self, dir: Direction) -> bool {
        if self.state != SessionState::Running || !self.snake.accepts_turn(dir) {
            return false;
        }
        self.pending = Some(dir.velocity(self.config.grid_size));
        true
    }

    /// Runs one tick. A no-op returning `moved == false` outside `Running`.
    pub fn advance(&mut self) -> TickResult {
        if self.state != SessionState::Running {
            return self.idle_result();
        }

        self.ticks += 1;
        if let Some(velocity) = self.pending.take() {
            self.snake.set_velocity(velocity);
        }

        let head = self.snake.step(self.bounds, self.config.grid_size);
        let mut result = TickResult { moved: true, ..TickResult::default() };

        if head == self.food {
            result.ate_food = true;
            self.eat(head);
            if !self.relocate_food() {
                result.board_filled = true;
            }
        }

        if self.snake.head_collides() {
            result.collided = true;
            self.state = SessionState::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            info!(score = self.score, length = self.snake.max_cells(), "game over");
        }

        result.score = self.score;
        result.length = self.snake.max_cells();
        debug!(tick = self.ticks, ?head, ate = result.ate_food, collided = result.collided, "tick");
        result
    }

    /// Replaces the snake and food of the current session without touching
    /// score or state. Every cell must be a grid-aligned board cell and
    /// `food` may not lie on the snake.
    pub fn set_board(&mut self, snake: Snake, food: Coords) -> bool {
        let on_board = |pos: &Coords| self.is_board_cell(*pos);
        if !on_board(&food) || !snake.body().iter().all(on_board) || snake.occupies(food) {
            return false;
        }
        self.snake = snake;
        self.food = food;
        self.pending = None;
        true
    }

    /// Drains queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Coords {
        self.food
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn length(&self) -> usize {
        self.snake.max_cells()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    ///////////////////////////////////////////////////////////////////////////

    fn init_session(&mut self) {
        self.snake = canonical_snake(&self.config);
        self.pending = None;
        self.score = 0;
        self.ticks = 0;
        self.events.clear();
        // A one-cell snake on a board of at least 2x2 always leaves a free cell.
        if let Some(food) = place_food(self.config.food_placement, &self.grid, &self.snake, &mut self.rng) {
            self.food = food;
        }
    }

    fn eat(&mut self, at: Coords) {
        self.snake.grow();
        self.score += self.config.food_reward;
        self.events.push(GameEvent::FoodEaten { at });
        self.events.push(GameEvent::ScoreChanged { score: self.score });

        if self.score > self.high_score {
            self.high_score = self.score;
            self.events.push(GameEvent::HighScoreChanged { high_score: self.high_score });
            if let Err(e) = self.store.save(self.high_score) {
                warn!("could not persist high score {}: {}", self.high_score, e);
            }
        }
    }

    fn relocate_food(&mut self) -> bool {
        match place_food(self.config.food_placement, &self.grid, &self.snake, &mut self.rng) {
            Some(food) => {
                self.food = food;
                true
            }
            None => {
                self.state = SessionState::GameOver;
                self.events.push(GameEvent::BoardFilled { score: self.score });
                info!(score = self.score, "board filled");
                false
            }
        }
    }

    fn is_board_cell(&self, (x, y): Coords) -> bool {
        let g = self.config.grid_size;
        x >= 0 && y >= 0 && x < self.bounds.width && y < self.bounds.height && x % g == 0 && y % g == 0
    }

    fn idle_result(&self) -> TickResult {
        TickResult {
            score: self.score,
            length: self.snake.max_cells(),
            ..TickResult::default()
        }
    }
}

fn canonical_snake(config: &GameConfig) -> Snake {
    Snake::new(
        config.start_position(),
        config.initial_length,
        config.start_direction.velocity(config.grid_size),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::{JsonFileStore, MemoryStore};
    use crate::snake::Direction::*;

    const G: i32 = 16;

    fn engine() -> GameEngine {
        engine_with_store(MemoryStore::default())
    }

    fn engine_with_store(store: MemoryStore) -> GameEngine {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Box::new(store), 42).unwrap();
        engine.start();
        engine
    }

    /// Parks the food in a corner away from the starting row.
    fn move_food_away(engine: &mut GameEngine) {
        let snake = engine.snake().clone();
        assert!(engine.set_board(snake, (0, 24 * G)));
    }

    #[test]
    fn test_starts_not_started_and_ignores_input() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 1).unwrap();
        assert_eq!(engine.state(), SessionState::NotStarted);
        assert!(!engine.request_direction_change(Up));

        let result = engine.advance();
        assert!(!result.moved);
        assert_eq!(engine.snake().head(), (160, 160));
    }

    #[test]
    fn test_same_axis_request_is_noop() {
        let mut engine = engine();
        move_food_away(&mut engine);

        assert!(!engine.request_direction_change(Right));
        engine.advance();
        assert_eq!(engine.snake().head(), (176, 160));
        assert_eq!(engine.snake().velocity(), Velocity { dx: G, dy: 0 });
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut engine = engine();
        move_food_away(&mut engine);

        assert!(!engine.request_direction_change(Left));
        engine.advance();
        assert_eq!(engine.snake().head(), (176, 160));
    }

    #[test]
    fn test_turn_is_buffered_until_next_tick() {
        let mut engine = engine();
        move_food_away(&mut engine);

        assert!(engine.request_direction_change(Up));
        assert_eq!(engine.snake().direction(), Right);

        engine.advance();
        assert_eq!(engine.snake().head(), (160, 144));
        assert_eq!(engine.snake().direction(), Up);
    }

    #[test]
    fn test_requests_checked_against_applied_axis_only() {
        let mut engine = engine();
        move_food_away(&mut engine);

        // Both vertical requests pass the horizontal check; the last one wins.
        assert!(engine.request_direction_change(Up));
        assert!(engine.request_direction_change(Down));
        // Still moving right, so a horizontal request is refused.
        assert!(!engine.request_direction_change(Left));

        engine.advance();
        assert_eq!(engine.snake().head(), (160, 176));
    }

    #[test]
    fn test_wraps_at_right_edge() {
        let mut engine = engine();
        let snake = Snake::new((24 * G, 80), 4, Right.velocity(G));
        assert!(engine.set_board(snake, (0, 24 * G)));

        let result = engine.advance();
        assert!(result.moved && !result.collided);
        assert_eq!(engine.snake().head(), (0, 80));
    }

    #[test]
    fn test_growth_on_food() {
        let mut engine = engine();
        let snake = Snake::from_cells(vec![(64, 64), (48, 64), (32, 64), (16, 64)], 4, Right.velocity(G)).unwrap();
        assert!(engine.set_board(snake, (80, 64)));

        let result = engine.advance();
        assert!(result.ate_food);
        assert_eq!(result.length, 5);
        assert_eq!(result.score, 10);
        assert_eq!(engine.score(), 10);
        assert!(!engine.snake().occupies(engine.food()));

        // The extra cell shows up on the following tick.
        assert_eq!(engine.snake().body().len(), 4);
        move_food_away(&mut engine);
        engine.advance();
        assert_eq!(engine.snake().body().len(), 5);
    }

    #[test]
    fn test_collision_with_trailing_body() {
        let mut engine = engine();
        let cells = vec![(32, 32), (48, 48), (48, 32), (16, 16)];
        let snake = Snake::from_cells(cells, 4, Right.velocity(G)).unwrap();
        assert!(engine.set_board(snake, (0, 24 * G)));

        let result = engine.advance();
        assert!(result.collided);
        assert_eq!(engine.state(), SessionState::GameOver);
        assert!(engine.take_events().contains(&GameEvent::GameOver { score: 0 }));

        // Terminal for input.
        assert!(!engine.request_direction_change(Up));
        assert!(!engine.advance().moved);
    }

    #[test]
    fn test_chasing_tail_is_not_collision() {
        let mut engine = engine();
        let cells = vec![(0, 0), (16, 0), (16, 16), (0, 16)];
        let snake = Snake::from_cells(cells, 4, Down.velocity(G)).unwrap();
        assert!(engine.set_board(snake, (0, 24 * G)));

        let result = engine.advance();
        assert!(!result.collided);
        assert_eq!(engine.state(), SessionState::Running);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = engine();
        engine.request_direction_change(Down);
        for _ in 0..5 {
            engine.advance();
        }

        engine.reset();
        let first = (engine.score(), engine.length(), engine.state(), engine.snake().head(), engine.snake().direction());
        engine.reset();
        let second = (engine.score(), engine.length(), engine.state(), engine.snake().head(), engine.snake().direction());

        assert_eq!(first, second);
        assert_eq!(first, (0, 4, SessionState::Running, (160, 160), Right));
        assert!(!engine.snake().occupies(engine.food()));
    }

    #[test]
    fn test_pause_freezes_the_board() {
        let mut engine = engine();
        move_food_away(&mut engine);
        engine.pause();
        assert_eq!(engine.state(), SessionState::Paused);

        assert!(!engine.request_direction_change(Up));
        assert!(!engine.advance().moved);
        assert_eq!(engine.snake().head(), (160, 160));

        engine.resume();
        assert!(engine.advance().moved);
        assert_eq!(engine.snake().head(), (176, 160));
    }

    #[test]
    fn test_toggle_pause_only_while_playing() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 3).unwrap();
        engine.toggle_pause();
        assert_eq!(engine.state(), SessionState::NotStarted);

        engine.start();
        engine.toggle_pause();
        assert_eq!(engine.state(), SessionState::Paused);
        engine.toggle_pause();
        assert_eq!(engine.state(), SessionState::Running);
    }

    #[test]
    fn test_high_score_saved_when_beaten() {
        let store = MemoryStore::new(10);
        let mut engine = engine_with_store(store.clone());
        assert_eq!(engine.high_score(), 10);

        for expected in [10u64, 20].iter() {
            let head = engine.snake().head();
            let snake = engine.snake().clone();
            assert!(engine.set_board(snake, (head.0 + G, head.1)));
            engine.advance();
            assert_eq!(engine.score(), *expected);
        }

        assert_eq!(engine.high_score(), 20);
        assert_eq!(store.get(), 20);
        let events = engine.take_events();
        assert!(events.contains(&GameEvent::HighScoreChanged { high_score: 20 }));
        assert!(!events.contains(&GameEvent::HighScoreChanged { high_score: 10 }));
    }

    #[test]
    fn test_high_score_survives_sessions_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");

        let mut engine = GameEngine::with_seed(GameConfig::default(), Box::new(JsonFileStore::new(&path)), 9).unwrap();
        engine.start();
        let snake = engine.snake().clone();
        assert!(engine.set_board(snake, (176, 160)));
        engine.advance();
        engine.reset();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.high_score(), 10);

        let engine = GameEngine::with_seed(GameConfig::default(), Box::new(JsonFileStore::new(&path)), 9).unwrap();
        assert_eq!(engine.high_score(), 10);
    }

    #[test]
    fn test_filling_the_board_ends_session() {
        let config = GameConfig {
            board_width: 2,
            board_height: 2,
            start_cell: (0, 0),
            ..GameConfig::default()
        };
        let mut engine = GameEngine::with_seed(config, Box::new(MemoryStore::default()), 5).unwrap();
        engine.start();

        let snake = Snake::from_cells(vec![(16, 16), (0, 16), (0, 0)], 4, Up.velocity(G)).unwrap();
        assert!(engine.set_board(snake, (16, 0)));

        let result = engine.advance();
        assert!(result.ate_food && result.board_filled && !result.collided);
        assert_eq!(engine.state(), SessionState::GameOver);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig { board_width: 0, ..GameConfig::default() };
        let result = GameEngine::with_seed(config, Box::new(MemoryStore::default()), 1);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let config = GameConfig { grid_size: 0, ..GameConfig::default() };
        assert!(GameEngine::with_seed(config, Box::new(MemoryStore::default()), 1).is_err());
    }

    #[test]
    fn test_set_board_refuses_cells_off_the_grid() {
        let mut engine = engine();
        let snake = engine.snake().clone();
        assert!(!engine.set_board(snake.clone(), (400, 0)));
        assert!(!engine.set_board(snake.clone(), (8, 0)));
        assert!(!engine.set_board(snake, (-16, 0)));

        let stray = Snake::from_cells(vec![(25 * G, 0), (24 * G, 0)], 4, Right.velocity(G)).unwrap();
        assert!(!engine.set_board(stray, (0, 0)));
        let unaligned = Snake::from_cells(vec![(20, 0)], 4, Right.velocity(G)).unwrap();
        assert!(!engine.set_board(unaligned, (0, 0)));
        assert_eq!(engine.snake().head(), (160, 160));
    }

    #[test]
    fn test_set_board_refuses_food_on_snake() {
        let mut engine = engine();
        let snake = engine.snake().clone();
        assert!(!engine.set_board(snake, (160, 160)));
    }
}
