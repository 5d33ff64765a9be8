#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use winit::dpi::LogicalSize;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::web::{EventLoopExtWebSys, WindowBuilderExtWebSys};
use winit::window::WindowBuilder;

use crate::app::AppState;
use crate::{Game, Level, Renderer};

/// Attaches the game to the canvas with id `canvas_id`.
///
/// `level_xml` replaces the built-in level when provided.
#[wasm_bindgen]
pub async fn run(canvas_id: String, level_xml: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let level = match level_xml {
        Some(xml) => Level::from_xml(&xml),
        None => Level::builtin(),
    }
    .map_err(|err| js_error("failed to load level", err))?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("missing document"))?;
    let canvas: web_sys::HtmlCanvasElement = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;

    let event_loop = EventLoop::new().map_err(|err| js_error("failed to create event loop", err))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_canvas(Some(canvas))
            .with_title("Cat vs Zombies")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| js_error("window error", err))?,
    );

    let renderer = Renderer::new(Arc::clone(&window))
        .await
        .map_err(|err| js_error("renderer error", format!("{err:#}")))?;
    let game = Game::new(&level).map_err(|err| js_error("failed to build level", format!("{err:#}")))?;

    log_to_console(&format!(
        "Loaded level {} with {} props",
        level.name,
        game.props().len()
    ));

    let mut app = AppState::new(renderer, game);
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.spawn(move |event, elwt| {
        app.handle(&event, elwt);
        if let Some(err) = app.take_error() {
            log_to_console(&format!("Error: {err:#}"));
        }
    });

    Ok(())
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {err}"))
}

fn log_to_console(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
