//! WebAssembly bindings for the page's single game session.
//!
//! Values cross the boundary as plain JS objects with camelCase fields.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::game::GameState;
use crate::types::{Coord, Move, PieceId, Player};

static GAME: Lazy<Mutex<Option<GameState>>> = Lazy::new(|| Mutex::new(None));

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn engine_error(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn with_game<T>(f: impl FnOnce(&mut GameState) -> Result<T, JsValue>) -> Result<T, JsValue> {
    let mut guard = GAME
        .lock()
        .map_err(|_| JsValue::from_str("game session is poisoned"))?;
    let game = guard
        .as_mut()
        .ok_or_else(|| JsValue::from_str("no game in progress"))?;
    f(game)
}

/// Starts a new game. `config` may be `undefined` or a partial config object.
#[wasm_bindgen]
pub fn new_game(config: JsValue) -> Result<JsValue, JsValue> {
    let config: GameConfig = if config.is_undefined() || config.is_null() {
        GameConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|err| JsValue::from_str(&err.to_string()))?
    };
    let game = GameState::new(&config).map_err(engine_error)?;
    let snapshot = to_js(&game.snapshot())?;

    let mut guard = GAME
        .lock()
        .map_err(|_| JsValue::from_str("game session is poisoned"))?;
    *guard = Some(game);
    Ok(snapshot)
}

#[wasm_bindgen]
pub fn game_state() -> Result<JsValue, JsValue> {
    with_game(|game| to_js(&game.snapshot()))
}

#[wasm_bindgen]
pub fn select_piece(id: PieceId) -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.select(id).map_err(engine_error)?;
        to_js(&game.legal_targets())
    })
}

#[wasm_bindgen]
pub fn deselect_piece() -> Result<(), JsValue> {
    with_game(|game| game.deselect().map_err(engine_error))
}

#[wasm_bindgen]
pub fn legal_moves(id: PieceId) -> Result<JsValue, JsValue> {
    with_game(|game| to_js(&game.legal_moves(id)))
}

/// Commits a move object previously returned by `legal_moves`.
/// `revision` is the one reported by `game_state` when the move was listed.
/// It crosses the boundary as `u32` so JS can pass a plain number; a session
/// past `u32::MAX` commits can no longer use this entry point.
#[wasm_bindgen]
pub fn commit_move(revision: u32, mv: JsValue) -> Result<JsValue, JsValue> {
    let mv: Move =
        serde_wasm_bindgen::from_value(mv).map_err(|err| JsValue::from_str(&err.to_string()))?;
    with_game(|game| {
        let result = game.commit_at(u64::from(revision), mv).map_err(engine_error)?;
        to_js(&result)
    })
}

#[wasm_bindgen]
pub fn request_move(id: PieceId, x: i32, y: i32) -> Result<JsValue, JsValue> {
    with_game(|game| {
        let result = game
            .request_move(id, Coord::new(x, y))
            .map_err(engine_error)?;
        to_js(&result)
    })
}

/// `player` is 1 for black, 2 for white.
#[wasm_bindgen]
pub fn has_any_legal_move(player: u8) -> Result<bool, JsValue> {
    let player = Player::from_code(player)
        .ok_or_else(|| {
            JsValue::from_str(&format!(
                "invalid player code {player}, expected {} or {}",
                Player::Black.code(),
                Player::White.code()
            ))
        })?;
    with_game(|game| Ok(game.has_any_legal_move(player)))
}
