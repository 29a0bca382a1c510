//! Browser bindings
//!
//! One `WebArcade` per mounted game. The page forwards keyboard and touch
//! events, calls `advance` from `requestAnimationFrame`, and draws whatever
//! `frame_json` describes. Dropping the object (or calling `teardown`) stops
//! all scheduling.

use wasm_bindgen::prelude::*;

use crate::leaderboard::Leaderboard;
use crate::platform::{Key, LocalStorage};
use crate::runner::GameRunner;
use crate::settings::{PongMode, Settings};
use crate::sim::create_game;
use crate::tuning::Tuning;
use crate::{ArcadeError, GameId};

fn js_error(e: ArcadeError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Retro Arcade loaded");
}

#[wasm_bindgen]
pub struct WebArcade {
    runner: GameRunner<LocalStorage>,
}

#[wasm_bindgen]
impl WebArcade {
    /// Mount a game by slug ("tetris", "snake", "pacman", "asteroids",
    /// "space-invaders", "pong"). `tuning_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(game: &str, tuning_json: &str) -> Result<WebArcade, JsValue> {
        let id: GameId = game.parse().map_err(js_error)?;
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).map_err(js_error)?
        };
        let store = LocalStorage;
        let settings = Settings::load(&store);
        let seed = settings.session_seed(js_sys::Date::now());
        let core = create_game(id, seed, &tuning, &settings);
        Ok(WebArcade {
            runner: GameRunner::new(core, store),
        })
    }

    /// DOM `KeyboardEvent.key` (or a touch button's key name). Returns true if
    /// the key is one the arcade uses, so the page can `preventDefault`.
    pub fn key_down(&mut self, key: &str, now_ms: f64) -> bool {
        match Key::from_dom_key(key) {
            Some(k) => {
                self.runner.key_down(k, now_ms);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(k) = Key::from_dom_key(key) {
            self.runner.key_up(k);
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.runner.start(now_ms);
    }

    /// Returns the new phase name
    pub fn toggle_pause(&mut self, now_ms: f64) -> String {
        format!("{:?}", self.runner.toggle_pause(now_ms)).to_lowercase()
    }

    /// Window blur or hidden tab
    pub fn suspend(&mut self) {
        self.runner.suspend();
    }

    pub fn reset(&mut self) {
        self.runner.reset();
    }

    /// Run due ticks; returns how many ran
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        self.runner.advance(now_ms)
    }

    pub fn frame_json(&self) -> Result<String, JsValue> {
        self.runner.frame().to_json().map_err(js_error)
    }

    pub fn high_score(&self) -> f64 {
        self.runner.high_score() as f64
    }

    pub fn teardown(&mut self) {
        self.runner.teardown();
    }
}

/// Leaderboard document (seeded with sample data on first use)
#[wasm_bindgen]
pub fn leaderboard_json() -> Result<String, JsValue> {
    let mut store = LocalStorage;
    Leaderboard::load(&mut store).to_json().map_err(js_error)
}

#[wasm_bindgen]
pub fn set_player_name(name: &str) -> Result<(), JsValue> {
    let mut store = LocalStorage;
    let mut board = Leaderboard::load(&mut store);
    board.set_player_name(&mut store, name).map_err(js_error)
}

/// Persist the Pong mode used by games mounted afterwards
#[wasm_bindgen]
pub fn set_pong_mode(mode: &str) -> Result<(), JsValue> {
    let mode = PongMode::parse(mode)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown Pong mode: {}", mode)))?;
    let mut store = LocalStorage;
    let mut settings = Settings::load(&store);
    settings.pong_mode = mode;
    settings.save(&mut store).map_err(js_error)
}
