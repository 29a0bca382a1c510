//! Retro Arcade entry point
//!
//! The browser build is driven through the `web` bindings in the library.
//! Natively this runs a headless demo: each game (or the one named on the
//! command line) plays itself with random key presses until the session ends
//! or the tick budget runs out.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use retro_arcade::platform::{Key, MemoryStore};
    use retro_arcade::sim::{SessionPhase, create_game};
    use retro_arcade::{GameId, GameRunner, Settings, Tuning};

    /// Ticks per game before giving up
    const TICK_BUDGET: u32 = 20_000;

    fn keys_for(game: GameId) -> &'static [Key] {
        match game {
            GameId::Tetris => &[Key::ArrowLeft, Key::ArrowRight, Key::ArrowUp, Key::ArrowDown],
            GameId::Snake | GameId::PacMan => {
                &[Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft, Key::ArrowRight]
            }
            GameId::Asteroids => &[Key::ArrowLeft, Key::ArrowUp, Key::Space],
            GameId::SpaceInvaders => &[Key::ArrowLeft, Key::ArrowRight, Key::Space],
            GameId::Pong => &[Key::W, Key::S],
        }
    }

    /// Play one game to the end; returns (score, ticks)
    pub fn play(game: GameId, seed: u64, tuning: &Tuning, settings: &Settings) -> (u64, u32) {
        let mut runner = GameRunner::new(create_game(game, seed, tuning, settings), MemoryStore::new());
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let keys = keys_for(game);

        let mut now = 0.0;
        runner.key_down(Key::Enter, now);
        runner.key_up(Key::Enter);

        let mut ticks = 0;
        while ticks < TICK_BUDGET && runner.phase() == SessionPhase::Running {
            let key = keys[rng.random_range(0..keys.len())];
            if rng.random_bool(0.5) {
                runner.key_down(key, now);
            } else {
                runner.key_up(key);
            }
            now += f64::from(runner.game().tick_period_ms());
            ticks += runner.advance(now);
        }
        runner.teardown();
        (runner.session().score(), ticks)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use retro_arcade::{GameId, Settings, Tuning};

    env_logger::init();
    log::info!("Retro Arcade (native) starting...");

    let mut args = std::env::args().skip(1);
    let games: Vec<GameId> = match args.next() {
        Some(name) => match name.parse() {
            Ok(game) => vec![game],
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        },
        None => GameId::ALL.to_vec(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

    let tuning = Tuning::default();
    let settings = Settings::default();
    for game in games {
        let (score, ticks) = demo::play(game, seed, &tuning, &settings);
        println!("{:<15} score {:>6} after {:>5} ticks", game.display_name(), score, ticks);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
