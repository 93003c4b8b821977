mod app;
mod components;
mod utils;

pub mod api;
pub mod config;
pub mod editor;
pub mod persistence;
pub mod render;
pub mod scene;
pub mod types;

use app::App;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Starting canvas board");
    yew::Renderer::<App>::new().render();
}
