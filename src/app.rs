use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{debug, error, warn};
use winit::event::{
    DeviceEvent, ElementState, Event, KeyEvent, MouseButton as WinitMouseButton, WindowEvent,
};
use winit::event_loop::EventLoopWindowTarget;
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::CursorGrabMode;

use crate::game::{Game, GameSnapshot};
use crate::input::{InputState, KeyCode, MouseButton, NamedKey};
use crate::render::Renderer;

/// Simulation step used by headless runs.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Window, renderer and game driven by the winit event loop.
pub struct AppState {
    renderer: Renderer,
    game: Game,
    input: InputState,
    clock: FrameClock,
    cursor_grabbed: bool,
    title: String,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    pub fn new(renderer: Renderer, game: Game) -> Self {
        Self {
            renderer,
            game,
            input: InputState::new(),
            clock: FrameClock::default(),
            cursor_grabbed: false,
            title: String::new(),
            last_error: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Takes the error that stopped the loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.last_error.take()
    }

    /// Feeds one winit event to the game, exiting the loop on fatal errors.
    pub fn handle(&mut self, event: &Event<()>, elwt: &EventLoopWindowTarget<()>) {
        if let Err(err) = self.process_event(event, elwt) {
            error!("stopping: {err:?}");
            self.last_error = Some(err);
            elwt.exit();
        }
    }

    fn process_event(&mut self, event: &Event<()>, elwt: &EventLoopWindowTarget<()>) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => self.renderer.resize(*size),
                    WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(event),
                    WindowEvent::MouseInput { state, button, .. } => {
                        if *state == ElementState::Pressed && !self.cursor_grabbed {
                            self.grab_cursor(true);
                        }
                        let button = map_mouse_button(*button);
                        match state {
                            ElementState::Pressed => self.input.set_mouse_button_down(button),
                            ElementState::Released => self.input.set_mouse_button_up(button),
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.input
                            .set_mouse_position(Vec2::new(position.x as f32, position.y as f32));
                    }
                    WindowEvent::Focused(false) => {
                        self.input.clear();
                        self.grab_cursor(false);
                    }
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } if self.cursor_grabbed => {
                self.input
                    .add_mouse_delta(Vec2::new(delta.0 as f32, delta.1 as f32));
            }
            Event::AboutToWait => self.renderer.window().request_redraw(),
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if code == WinitKey::Escape && event.state == ElementState::Pressed {
            self.grab_cursor(false);
        }
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.input.set_key_down(key),
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn grab_cursor(&mut self, grab: bool) {
        let window = self.renderer.window();
        let result = if grab {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        match result {
            Ok(()) => {
                window.set_cursor_visible(!grab);
                self.cursor_grabbed = grab;
            }
            Err(err) => warn!("cursor grab unavailable: {err}"),
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let dt = self.clock.tick();
        self.game.update(dt, &self.input)?;
        for event in self.game.drain_events() {
            debug!("net {}: {event:?}", event.name());
        }

        let status = self.game.status_line();
        if status != self.title {
            self.renderer
                .window()
                .set_title(&format!("Cat vs Zombies | {status}"));
            self.title = status;
        }

        let camera = self.game.camera_params(self.renderer.aspect());
        self.renderer.update_globals(&camera, &self.game.light());
        if let Err(err) = self.renderer.render(&self.game.scene().draw_list()) {
            if !self.renderer.recover(err) {
                return Err(anyhow!("GPU is out of memory"));
            }
        }
        Ok(())
    }
}

/// Measures wall-clock time between redraws.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    /// Seconds since the previous tick; zero on the first one.
    pub fn tick(&mut self) -> f32 {
        let now = now_seconds();
        let dt = self.last.map_or(0.0, |last| (now - last).max(0.0));
        self.last = Some(now);
        dt as f32
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn now_seconds() -> f64 {
    use once_cell::sync::Lazy;
    use std::time::Instant;

    static START: Lazy<Instant> = Lazy::new(Instant::now);
    START.elapsed().as_secs_f64()
}

#[cfg(target_arch = "wasm32")]
fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map_or(0.0, |performance| performance.now() / 1000.0)
}

pub fn print_final_state(snapshot: &GameSnapshot) {
    println!("Final state:");
    println!(" - phase: {:?}", snapshot.phase);
    println!(
        " - score: {} ({} zombies, {} cookies)",
        snapshot.score, snapshot.kills, snapshot.cookies_eaten
    );
    println!(
        " - health: {:.0}/{:.0}",
        snapshot.health, snapshot.max_health
    );
    println!(
        " - cat pos=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2})",
        snapshot.cat_position.x,
        snapshot.cat_position.y,
        snapshot.cat_position.z,
        snapshot.cat_color.x,
        snapshot.cat_color.y,
        snapshot.cat_color.z
    );
    println!(
        " - zombies: {}, cookies: {}, projectiles: {}",
        snapshot.zombies, snapshot.cookies, snapshot.projectiles
    );
    println!(" - round time: {:.2}s", snapshot.round_time);
}

pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
    };
    MouseButton::new(index)
}

pub fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::Space => KeyCode::Named(NamedKey::Space),
        WinitKey::Enter | WinitKey::NumpadEnter => KeyCode::Named(NamedKey::Enter),
        WinitKey::Tab => KeyCode::Named(NamedKey::Tab),
        WinitKey::ArrowLeft => KeyCode::Named(NamedKey::Left),
        WinitKey::ArrowRight => KeyCode::Named(NamedKey::Right),
        WinitKey::ArrowUp => KeyCode::Named(NamedKey::Up),
        WinitKey::ArrowDown => KeyCode::Named(NamedKey::Down),
        WinitKey::Escape => KeyCode::Named(NamedKey::Escape),
        WinitKey::Backspace => KeyCode::Named(NamedKey::Backspace),
        WinitKey::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        WinitKey::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        WinitKey::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        WinitKey::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        WinitKey::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        WinitKey::AltRight => KeyCode::Named(NamedKey::RightAlt),
        WinitKey::Digit0 => KeyCode::Digit(0),
        WinitKey::Digit1 => KeyCode::Digit(1),
        WinitKey::Digit2 => KeyCode::Digit(2),
        WinitKey::Digit3 => KeyCode::Digit(3),
        WinitKey::Digit4 => KeyCode::Digit(4),
        WinitKey::Digit5 => KeyCode::Digit(5),
        WinitKey::Digit6 => KeyCode::Digit(6),
        WinitKey::Digit7 => KeyCode::Digit(7),
        WinitKey::Digit8 => KeyCode::Digit(8),
        WinitKey::Digit9 => KeyCode::Digit(9),
        WinitKey::KeyA => KeyCode::Character('A'),
        WinitKey::KeyB => KeyCode::Character('B'),
        WinitKey::KeyC => KeyCode::Character('C'),
        WinitKey::KeyD => KeyCode::Character('D'),
        WinitKey::KeyE => KeyCode::Character('E'),
        WinitKey::KeyF => KeyCode::Character('F'),
        WinitKey::KeyG => KeyCode::Character('G'),
        WinitKey::KeyH => KeyCode::Character('H'),
        WinitKey::KeyI => KeyCode::Character('I'),
        WinitKey::KeyJ => KeyCode::Character('J'),
        WinitKey::KeyK => KeyCode::Character('K'),
        WinitKey::KeyL => KeyCode::Character('L'),
        WinitKey::KeyM => KeyCode::Character('M'),
        WinitKey::KeyN => KeyCode::Character('N'),
        WinitKey::KeyO => KeyCode::Character('O'),
        WinitKey::KeyP => KeyCode::Character('P'),
        WinitKey::KeyQ => KeyCode::Character('Q'),
        WinitKey::KeyR => KeyCode::Character('R'),
        WinitKey::KeyS => KeyCode::Character('S'),
        WinitKey::KeyT => KeyCode::Character('T'),
        WinitKey::KeyU => KeyCode::Character('U'),
        WinitKey::KeyV => KeyCode::Character('V'),
        WinitKey::KeyW => KeyCode::Character('W'),
        WinitKey::KeyX => KeyCode::Character('X'),
        WinitKey::KeyY => KeyCode::Character('Y'),
        WinitKey::KeyZ => KeyCode::Character('Z'),
        WinitKey::F1 => KeyCode::Function(1),
        WinitKey::F2 => KeyCode::Function(2),
        WinitKey::F3 => KeyCode::Function(3),
        WinitKey::F4 => KeyCode::Function(4),
        WinitKey::F5 => KeyCode::Function(5),
        WinitKey::F6 => KeyCode::Function(6),
        WinitKey::F7 => KeyCode::Function(7),
        WinitKey::F8 => KeyCode::Function(8),
        WinitKey::F9 => KeyCode::Function(9),
        WinitKey::F10 => KeyCode::Function(10),
        WinitKey::F11 => KeyCode::Function(11),
        WinitKey::F12 => KeyCode::Function(12),
        _ => return None,
    })
}
