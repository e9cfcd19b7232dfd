//! Serpent Siege entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use glam::Vec2;
    use serpent_siege::audio::{AudioManager, SoundEffect};
    use serpent_siege::render::Renderer;
    use serpent_siege::sim::{
        purchase_pack, tick, GameConfig, GameEvent, GameState, InputState, RunPhase,
    };
    use serpent_siege::Settings;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Option<Renderer>,
        audio: AudioManager,
        settings: Settings,
        input: InputState,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Canvas client size, for mapping pointer coords to the field
        canvas_size: (f32, f32),
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_muted(settings.muted);
            Self {
                state: GameState::new(GameConfig::default(), seed),
                renderer: None,
                audio,
                settings,
                input: InputState::default(),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                canvas_size: (0.0, 0.0),
            }
        }

        /// Map pointer coordinates (canvas client space) to field space
        fn pointer_to_field(&self, x: f32, y: f32) -> Vec2 {
            let (cw, ch) = self.canvas_size;
            if cw <= 0.0 || ch <= 0.0 {
                return Vec2::new(x, y);
            }
            Vec2::new(
                x / cw * self.state.config.width,
                y / ch * self.state.config.height,
            )
        }

        /// Run one frame of simulation
        fn update(&mut self, dt: f32, time: f64) {
            tick(&mut self.state, &self.input, dt);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            self.dispatch_events();
        }

        /// Hand every queued simulation event to the HUD and the audio layer
        fn dispatch_events(&mut self) {
            let document = web_sys::window().and_then(|w| w.document());
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Shoot => self.audio.play(SoundEffect::Shoot),
                    GameEvent::Hit => self.audio.play(SoundEffect::Hit),
                    GameEvent::HealthChanged { health, max } => {
                        set_hud_text(&document, "hud-health", &format!("{:.0}/{:.0}", health, max));
                    }
                    GameEvent::ScoreChanged { score } => {
                        set_hud_text(&document, "hud-score", &score.to_string());
                    }
                    GameEvent::KillsChanged { kills } => {
                        set_hud_text(&document, "hud-kills", &kills.to_string());
                    }
                    GameEvent::XpChanged { xp, required } => {
                        set_hud_text(&document, "hud-xp", &format!("{}/{}", xp, required));
                    }
                    GameEvent::LevelUp { level } => {
                        self.audio.play(SoundEffect::LevelUp);
                        set_hud_text(&document, "hud-level", &level.to_string());
                    }
                    GameEvent::CurrencyChanged { points } => {
                        set_hud_text(&document, "hud-points", &points.to_string());
                    }
                    GameEvent::PowerUpActivated { kind, .. } => {
                        self.audio.play(SoundEffect::PowerUp);
                        set_hud_text(&document, "hud-powerup", kind.as_str());
                    }
                    GameEvent::PowerUpExpired { .. } => {
                        set_hud_text(&document, "hud-powerup", "-");
                    }
                    GameEvent::AllySummoned => self.audio.play(SoundEffect::AllySummon),
                    GameEvent::AllyDespawned => self.audio.play(SoundEffect::AllyDespawn),
                    GameEvent::GameOver {
                        score,
                        kills,
                        level,
                    } => {
                        self.audio.play(SoundEffect::GameOver);
                        if let Some(doc) = &document {
                            if let Some(el) = doc.get_element_by_id("game-over") {
                                let _ = el.set_attribute("class", "");
                            }
                            if let Some(el) = doc.get_element_by_id("final-score") {
                                el.set_text_content(Some(&score.to_string()));
                            }
                            if let Some(el) = doc.get_element_by_id("final-kills") {
                                el.set_text_content(Some(&kills.to_string()));
                            }
                            if let Some(el) = doc.get_element_by_id("final-level") {
                                el.set_text_content(Some(&level.to_string()));
                            }
                        }
                    }
                }
            }

            set_hud_text(&document, "hud-fps", &self.fps.to_string());
        }

        /// Render the current frame
        fn render(&self) {
            if let Some(renderer) = &self.renderer {
                renderer.draw(&self.state);
            }
        }

        fn restart(&mut self) {
            self.state.start_run();
            self.input = InputState::default();
            if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
                if let Some(el) = doc.get_element_by_id("game-over") {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    fn set_hud_text(document: &Option<web_sys::Document>, id: &str, text: &str) {
        if let Some(doc) = document {
            if let Some(el) = doc.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Serpent Siege starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Match the backing store to the displayed size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        canvas.set_width((f64::from(client_w) * dpr) as u32);
        canvas.set_height((f64::from(client_h) * dpr) as u32);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        {
            let mut g = game.borrow_mut();
            g.canvas_size = (client_w as f32, client_h as f32);
            g.renderer = Renderer::new(&canvas).ok();
            if g.renderer.is_none() {
                log::error!("Failed to create 2d rendering context");
            }
            g.state.start_run();
        }

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());

        request_animation_frame(game);

        log::info!("Serpent Siege running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard: WASD/arrows move, space fires, digits buy packs
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" | "ArrowUp" => g.input.up = true,
                    "s" | "S" | "ArrowDown" => g.input.down = true,
                    "a" | "A" | "ArrowLeft" => g.input.left = true,
                    "d" | "D" | "ArrowRight" => g.input.right = true,
                    " " => g.input.fire = true,
                    "Enter" => {
                        if g.state.phase != RunPhase::Running {
                            g.restart();
                        }
                    }
                    key => {
                        // Digit keys map to the pack table in order
                        if let Some(digit) = key.chars().next().and_then(|c| c.to_digit(10)) {
                            if digit >= 1 {
                                let idx = (digit - 1) as usize;
                                if let Some(pack) = g.state.config.packs.get(idx) {
                                    let id = pack.kind.as_str();
                                    purchase_pack(&mut g.state, id);
                                }
                            }
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" | "ArrowUp" => g.input.up = false,
                    "s" | "S" | "ArrowDown" => g.input.down = false,
                    "a" | "A" | "ArrowLeft" => g.input.left = false,
                    "d" | "D" | "ArrowRight" => g.input.right = false,
                    " " => g.input.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: move aims, held button fires
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.canvas_size = (
                    canvas_clone.client_width() as f32,
                    canvas_clone.client_height() as f32,
                );
                g.input.aim =
                    g.pointer_to_field(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                if g.state.phase == RunPhase::Running {
                    g.input.fire = true;
                } else {
                    g.restart();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.fire = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: drag aims and fires
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    let rect = canvas_clone.get_bounding_client_rect();
                    g.canvas_size = (
                        canvas_clone.client_width() as f32,
                        canvas_clone.client_height() as f32,
                    );
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.input.aim = g.pointer_to_field(x, y);
                    if g.state.phase == RunPhase::Running {
                        g.input.fire = true;
                    } else {
                        g.restart();
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.fire = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Restart button on the game-over panel
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().restart();
                log::info!("Game restarted");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mute toggle
        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let muted = !g.audio.muted();
                g.audio.set_muted(muted);
                g.settings.muted = muted;
                g.settings.save();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // One shop button per pack, keyed by effect id
        let packs: Vec<&'static str> = game
            .borrow()
            .state
            .config
            .packs
            .iter()
            .map(|p| p.kind.as_str())
            .collect();
        for id in packs {
            if let Some(btn) = document.get_element_by_id(&format!("pack-{id}")) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    purchase_pack(&mut game.borrow_mut().state, id);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use serpent_siege::sim::{tick, GameConfig, GameState, InputState, RunPhase};

    env_logger::init();
    log::info!("Serpent Siege (native) starting...");

    // Headless demo: an autopilot player that aims at the nearest snake and
    // holds the trigger for a minute of simulated time.
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(1);
    let mut state = GameState::new(GameConfig::default(), seed);
    state.start_run();

    let dt = 1.0 / 60.0;
    let mut input = InputState {
        fire: true,
        ..Default::default()
    };
    for _ in 0..(60 * 60) {
        if state.phase != RunPhase::Running {
            break;
        }
        input.aim = state
            .snakes
            .iter()
            .filter(|s| s.active)
            .min_by(|a, b| {
                let da = (a.pos - state.player.pos).length_squared();
                let db = (b.pos - state.player.pos).length_squared();
                da.total_cmp(&db)
            })
            .map(|s| s.pos)
            .unwrap_or(Vec2::new(
                state.config.width / 2.0,
                state.config.height / 4.0,
            ));
        tick(&mut state, &input, dt);
        state.drain_events();
    }

    let p = &state.progression;
    log::info!(
        "demo finished after {:.1}s: score {} kills {} level {} health {:.0}",
        state.elapsed,
        p.score,
        p.kills,
        p.level,
        state.player.health
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
