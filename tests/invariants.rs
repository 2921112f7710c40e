use proptest::prelude::*;

use snake::highscore::MemoryStore;
use snake::{Direction, GameConfig, GameEngine, SessionState};

const G: i32 = 16;

fn small_config() -> GameConfig {
    GameConfig {
        board_width: 6,
        board_height: 5,
        start_cell: (2, 2),
        ..GameConfig::default()
    }
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

/// Distance of one step on a wrapping axis, in cells.
fn wrapped_delta(from: i32, to: i32, extent: i32) -> i32 {
    let d = (to - from).rem_euclid(extent);
    d.min(extent - d)
}

proptest! {
    #[test]
    fn tick_invariants_hold(seed in any::<u64>(), moves in prop::collection::vec(prop::option::of(direction()), 1..400)) {
        let config = small_config();
        let (width, height) = (config.board_width * G, config.board_height * G);
        let mut engine = GameEngine::with_seed(config, Box::new(MemoryStore::default()), seed).unwrap();
        engine.start();

        for request in moves {
            if engine.state() == SessionState::GameOver {
                engine.reset();
            }

            let before = engine.snake().head();
            if let Some(dir) = request {
                engine.request_direction_change(dir);
            }
            let result = engine.advance();
            prop_assert!(result.moved);

            let snake = engine.snake();
            let head = snake.head();
            prop_assert!(snake.body().len() <= engine.length());
            prop_assert_eq!(result.length, engine.length());
            prop_assert_eq!(result.score, engine.score());
            prop_assert_eq!(engine.score(), (engine.length() as u64 - 4) * 10);

            for &(x, y) in snake.body() {
                prop_assert!(x >= 0 && x < width && y >= 0 && y < height);
                prop_assert!(x % G == 0 && y % G == 0);
            }

            let steps = wrapped_delta(before.0, head.0, width) + wrapped_delta(before.1, head.1, height);
            prop_assert_eq!(steps, G);

            if !result.board_filled {
                prop_assert!(!snake.occupies(engine.food()));
            }
            prop_assert_eq!(result.collided || result.board_filled, engine.state() == SessionState::GameOver);
        }
    }

    #[test]
    fn high_score_never_below_score(seed in any::<u64>(), moves in prop::collection::vec(direction(), 1..200)) {
        let store = MemoryStore::default();
        let mut engine = GameEngine::with_seed(small_config(), Box::new(store.clone()), seed).unwrap();
        engine.start();

        let mut best = 0;
        for dir in moves {
            if engine.state() == SessionState::GameOver {
                engine.reset();
            }
            engine.request_direction_change(dir);
            engine.advance();
            best = best.max(engine.score());
            prop_assert!(engine.high_score() >= engine.score());
        }
        prop_assert_eq!(engine.high_score(), best);
        prop_assert_eq!(store.get(), best);
    }
}
