use wasm_bindgen::prelude::*;
use stack_engine::*;

mod config;
mod drag;
mod events;
mod game;
mod placement;
mod selection;
mod stability;
mod tower;

use game::TowerGame;

stack_web::export_game!(TowerGame, "tower-game");
