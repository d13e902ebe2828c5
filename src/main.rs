//! Sky Sprint entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use skysprint::renderer::Renderer;
    use skysprint::sim::{GameEvent, GamePhase, GameState, TickInput, Viewport, tick};
    use skysprint::{HighScore, Settings, Tuning};

    /// LocalStorage key for the mid-run snapshot
    const SNAPSHOT_KEY: &str = "skysprint_save";

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Option<Renderer>,
        settings: Settings,
        high_score: HighScore,
        last_time: f64,
        input: TickInput,
        /// Sprite sheets decoded; the menu stays gated until then
        assets_loaded: bool,
        /// Track phase for the pause auto-save
        last_phase: GamePhase,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, viewport: Viewport, tuning: Tuning) -> Self {
            let settings = Settings::load();
            let high_score = HighScore::load();
            let state = GameState::new(seed, viewport, tuning, high_score.score);
            Self {
                state,
                renderer: None,
                settings,
                high_score,
                last_time: 0.0,
                input: TickInput::default(),
                assets_loaded: false,
                last_phase: GamePhase::MainMenu,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run one simulation frame
        fn update(&mut self, dt: f32, time: f64) {
            tick(&mut self.state, self.input, dt);
            // Clear one-shot inputs after processing
            self.input.pause = false;

            // Auto-save when entering pause so a closed tab can resume
            let phase = self.state.phase;
            if phase != self.last_phase {
                if phase == GamePhase::Paused {
                    save_snapshot(&self.state);
                }
                self.last_phase = phase;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref renderer) = self.renderer {
                renderer.render(&self.state, &self.settings);
            }
        }

        /// React to this frame's simulation events and refresh the HUD
        fn process_events(&mut self) {
            let window = match web_sys::window() {
                Some(w) => w,
                None => return,
            };
            let document = match window.document() {
                Some(d) => d,
                None => return,
            };

            // The menu (and the run) stay gated until every sheet is
            // decoded; the loading overlay covers the wait
            if !self.assets_loaded
                && self.renderer.as_ref().is_some_and(|r| r.assets_ready())
            {
                self.assets_loaded = true;
                if let Some(el) = document.get_element_by_id("loading") {
                    let _ = el.set_attribute("class", "hidden");
                }
                log::info!("Assets loaded");
            }

            for event in self.state.drain_events() {
                match event {
                    GameEvent::ScoreChanged(score) => {
                        if let Some(el) =
                            document.query_selector("#hud-score .hud-value").ok().flatten()
                        {
                            el.set_text_content(Some(&score.to_string()));
                        }
                    }
                    GameEvent::HealthChanged {
                        health,
                        tier,
                        overdrive,
                    } => {
                        let frac = health / self.state.tuning.max_health;
                        if let Some(el) = document.get_element_by_id("health-fill") {
                            let class = if overdrive {
                                "health-fill overdrive".to_string()
                            } else {
                                format!("health-fill tier-{}", tier.index())
                            };
                            let _ = el.set_attribute("class", &class);
                            let _ = el.set_attribute(
                                "style",
                                &format!("width: {:.1}%", frac * 100.0),
                            );
                        }
                    }
                    GameEvent::NewHighScore(score) => {
                        self.high_score.submit(score, js_sys::Date::now());
                        self.high_score.save();
                        log::info!("New high score: {}", score);
                    }
                    GameEvent::GameOverShown { score, best } => {
                        if let Some(el) = document.get_element_by_id("final-score") {
                            el.set_text_content(Some(&score.to_string()));
                        }
                        if let Some(el) = document.get_element_by_id("final-best") {
                            el.set_text_content(Some(&best.to_string()));
                        }
                        if let Some(el) = document.get_element_by_id("game-over") {
                            let _ = el.set_attribute("class", "");
                        }
                    }
                    GameEvent::CountdownTick(n) => {
                        if let Some(el) = document.get_element_by_id("countdown") {
                            el.set_text_content(Some(&n.to_string()));
                        }
                    }
                    GameEvent::GameOver { .. } => {
                        clear_saved_snapshot();
                    }
                    _ => {}
                }
            }

            // Phase-driven overlay visibility
            let overlays = [
                ("pause-menu", self.state.phase == GamePhase::Paused),
                ("countdown", self.state.phase == GamePhase::Countdown),
                (
                    "main-menu",
                    self.state.phase == GamePhase::MainMenu && self.assets_loaded,
                ),
                ("ready-go", self.state.phase == GamePhase::ReadyGo),
            ];
            for (id, visible) in overlays {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            }
            if self.state.phase != GamePhase::GameOver {
                if let Some(el) = document.get_element_by_id("game-over") {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
            if let Some(el) = document.get_element_by_id("ready-go") {
                if self.state.phase == GamePhase::ReadyGo {
                    el.set_text_content(Some(if self.state.go_shown() {
                        "GO!"
                    } else {
                        "Ready?"
                    }));
                }
            }

            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                if self.settings.show_fps {
                    el.set_text_content(Some(&self.fps.to_string()));
                } else {
                    el.set_text_content(Some(""));
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sky Sprint starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        canvas.set_width(client_w as u32);
        canvas.set_height(client_h as u32);

        let tuning = Tuning::default();
        if let Err(e) = tuning.validate() {
            log::error!("Bad tuning: {e}");
            return;
        }

        let seed = js_sys::Date::now() as u64;
        let viewport = Viewport::new(client_w as f32, client_h as f32);
        let game = Rc::new(RefCell::new(Game::new(seed, viewport, tuning)));

        match Renderer::new(&canvas) {
            Ok(renderer) => game.borrow_mut().renderer = Some(renderer),
            Err(e) => {
                log::error!("Renderer init failed: {e:?}");
                return;
            }
        }

        // Resume an interrupted run if one was saved on pause
        if let Some(mut saved) = load_saved_snapshot() {
            saved.set_viewport(viewport);
            log::info!("Restored saved run (score {})", saved.score);
            game.borrow_mut().state = saved;
        }

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_menu_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Sky Sprint running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move steers the runner
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.target_x = Some(event.offset_x() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    game.borrow_mut().input.target_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" | "p" | "P" => g.input.pause = true,
                    " " | "Enter" => {
                        if g.assets_loaded && g.state.phase == GamePhase::MainMenu {
                            g.state.start();
                        }
                    }
                    "f" | "F" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.assets_loaded {
                    g.state.start();
                    log::info!("Run started");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.restart();
                log::info!("Run restarted");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.resume();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("quit-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.state.quit();
                let (score, ts) = (g.state.best_score, js_sys::Date::now());
                if g.high_score.submit(score, ts) {
                    g.high_score.save();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Running {
                        g.state.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Running {
                    g.state.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Load the pause snapshot from LocalStorage, if any.
    fn load_saved_snapshot() -> Option<GameState> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let json = storage.get_item(SNAPSHOT_KEY).ok()??;
        GameState::from_snapshot(&json).ok()
    }

    fn save_snapshot(state: &GameState) {
        let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        else {
            return;
        };
        match state.to_snapshot() {
            Ok(json) => {
                if storage.set_item(SNAPSHOT_KEY, &json).is_ok() {
                    log::info!("Run saved (score {})", state.score);
                }
            }
            Err(e) => log::warn!("Snapshot failed: {e}"),
        }
    }

    fn clear_saved_snapshot() {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.remove_item(SNAPSHOT_KEY);
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
            g.process_events();
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
    env_logger::init();
    log::info!("Sky Sprint (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    demo_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless smoke run: a minute of simulated play with a centered player.
#[cfg(not(target_arch = "wasm32"))]
fn demo_run() {
    use skysprint::Tuning;
    use skysprint::sim::{GamePhase, GameState, TickInput, Viewport, tick};

    let tuning = Tuning::default();
    if let Err(e) = tuning.validate() {
        log::error!("Bad tuning: {e}");
        return;
    }
    let mut state = GameState::new(7, Viewport::new(450.0, 800.0), tuning, 0);
    state.start();

    let input = TickInput {
        target_x: Some(225.0),
        pause: false,
    };
    for _ in 0..3600 {
        tick(&mut state, input, 1.0 / 60.0);
        state.drain_events();
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    println!(
        "Demo run finished: score {}, tier {:?}, phase {:?}",
        state.score, state.tier, state.phase
    );
}
