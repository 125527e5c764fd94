//! Skydash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use skydash::assets::AssetCatalog;
    use skydash::audio::AudioPlayer;
    use skydash::highscores::{self, LocalBoard};
    use skydash::levels::{GameMode, LevelParams, merge_levels, resolve_level};
    use skydash::outbox::{DeviceClass, Outbox, RoundEvent, round_completed};
    use skydash::profile::{PlayerProfile, RoundSummary};
    use skydash::render::Renderer;
    use skydash::settings::Settings;
    use skydash::sim::{
        EndReason, GameEvent, GameState, RoundPhase, TickInput, ViewBounds, tick,
    };

    /// Cancellable rAF handle. Cancelling twice is a no-op.
    #[derive(Clone, Default)]
    struct FrameHandle(Rc<Cell<Option<i32>>>);

    impl FrameHandle {
        fn store(&self, id: i32) {
            self.0.set(Some(id));
        }

        fn is_scheduled(&self) -> bool {
            // Cell<Option<i32>> has no peek; take and put back
            let v = self.0.take();
            let scheduled = v.is_some();
            self.0.set(v);
            scheduled
        }

        fn cancel(&self) {
            if let Some(id) = self.0.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Renderer,
        audio: AudioPlayer,
        levels: Vec<LevelParams>,
        level_id: String,
        settings: Settings,
        profile: Option<PlayerProfile>,
        outbox: Outbox,
        board: LocalBoard,
        high_score: u32,
        input: TickInput,
        // TimeAttack wall-clock interval
        countdown_handle: Option<i32>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn current_level(&self) -> LevelParams {
            resolve_level(&self.levels, &self.level_id, self.state.mode)
        }

        /// Run one frame: tick, drain events, detect round end.
        fn update(&mut self, time: f64) {
            let level = self.current_level();
            tick(&mut self.state, &self.input, &level);
            self.input.jump = false;

            let mut ended = None;
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Sound(cue) => self.audio.play(cue),
                    GameEvent::RoundEnded {
                        score,
                        coins,
                        reason,
                    } => ended = Some((score, coins, reason)),
                }
            }
            if let Some((score, coins, reason)) = ended {
                self.finalize_round(score, coins, reason, &level);
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60_000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Round is over: persist, enqueue sink events, dispatch.
        fn finalize_round(
            &mut self,
            score: u32,
            coins: u32,
            reason: EndReason,
            level: &LevelParams,
        ) {
            self.clear_countdown();
            self.audio.stop_music();
            log::info!(
                "Round over ({:?}): score {score}, coins {coins} on {}",
                reason,
                level.name
            );

            let summary = RoundSummary {
                score,
                coins,
                difficulty: level.name.clone(),
                mode: self.state.mode,
                shield_absorbs: self.state.shield_absorbs,
                slowmo_used: self.state.slowmo_used,
                collisions: self.state.collisions,
                duration_frames: self.state.frame,
            };

            // Zen keeps no score anywhere
            if self.state.mode != GameMode::Zen {
                if score > self.high_score {
                    self.high_score = score;
                    highscores::save_high_score(score);
                }
                if self.profile.is_none() {
                    self.board.add_score(score, &level.name, js_sys::Date::now());
                    self.board.save();
                }
            }

            let delta = round_completed(
                &mut self.outbox,
                self.profile.as_ref(),
                &summary,
                js_sys::Date::now() as u64,
                detect_device_class(),
            );
            // Keep the local profile view current without waiting on sinks
            if let (Some(profile), Some(delta)) = (self.profile.as_mut(), delta) {
                profile.games_played = delta.games_played;
                profile.xp = profile.xp.saturating_add(delta.xp_gain);
                if let Some(high) = delta.new_high_score {
                    profile.high_score = high;
                }
                for achievement in &delta.unlocked {
                    log::info!("Achievement unlocked: {}", achievement.title());
                    profile.achievements.push(*achievement);
                }
            }
            self.dispatch_outbox();
        }

        /// Fire-and-forget sink dispatch. This deployment has no backend
        /// wired up, so events are serialized to the console for the page
        /// harness to forward; a failed dispatch is logged and dropped.
        fn dispatch_outbox(&mut self) {
            for event in self.outbox.drain() {
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        let sink = match &event {
                            RoundEvent::ProfileUpdate { .. } => "profile",
                            RoundEvent::LeaderboardEntry { .. } => "leaderboard",
                            RoundEvent::Telemetry { .. } => "telemetry",
                        };
                        log::info!("sink:{sink} {json}");
                    }
                    Err(err) => log::error!("Dropping undeliverable sink event: {err}"),
                }
            }
        }

        fn clear_countdown(&mut self) {
            if let Some(handle) = self.countdown_handle.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(handle);
                }
            }
        }

        /// Switch the selected level. Resets the round.
        fn select_level(&mut self, index: usize) {
            if let Some(level) = self.levels.get(index) {
                self.level_id = level.id.clone();
                self.clear_countdown();
                self.state.reset();
                log::info!("Level selected: {}", level.name);
            }
        }

        /// Cycle the game mode. Resets the round.
        fn cycle_mode(&mut self) {
            self.state.mode = self.state.mode.next();
            self.clear_countdown();
            self.state.reset();
            log::info!("Mode: {}", self.state.mode.as_str());
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let set = |id: &str, value: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(value));
                }
            };

            set("hud-score", &self.state.score.to_string());
            set("hud-coins", &self.state.coins.to_string());
            set("hud-best", &self.high_score.to_string());
            set("hud-level", &self.current_level().name);
            set("hud-mode", self.state.mode.as_str());
            if self.settings.show_fps {
                set("hud-fps", &self.fps.to_string());
            }

            if let Some(el) = document.get_element_by_id("hud-time") {
                match self.state.time_remaining {
                    Some(secs) => {
                        el.set_text_content(Some(&format!("{secs}s")));
                        let _ = el.set_attribute("class", "hud-item");
                    }
                    None => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("start-hint") {
                let class = if self.state.phase == RoundPhase::Ready {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.phase == RoundPhase::Over {
                    let _ = el.set_attribute("class", "");
                    set("final-score", &self.state.score.to_string());
                    set("final-coins", &self.state.coins.to_string());
                    if let Some(board_el) = document.get_element_by_id("local-board") {
                        let mut lines = String::new();
                        for (rank, entry) in self.board.entries.iter().enumerate() {
                            lines.push_str(&format!(
                                "{}. {} - {} ({})\n",
                                rank + 1,
                                entry.score,
                                entry.difficulty,
                                highscores::format_date(entry.timestamp)
                            ));
                        }
                        board_el.set_text_content(Some(&lines));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    fn detect_device_class() -> DeviceClass {
        let agent = web_sys::window()
            .map(|w| w.navigator())
            .and_then(|n| n.user_agent().ok());
        match agent {
            Some(ua) if ua.contains("Mobi") || ua.contains("Android") => DeviceClass::Mobile,
            Some(_) => DeviceClass::Desktop,
            None => DeviceClass::Unknown,
        }
    }

    /// Read embedded JSON out of a `<script type="application/json">` tag.
    fn read_json_tag(id: &str) -> Option<String> {
        web_sys::window()?
            .document()?
            .get_element_by_id(id)?
            .text_content()
            .filter(|s| !s.trim().is_empty())
    }

    fn load_levels() -> Vec<LevelParams> {
        let remote = read_json_tag("level-data")
            .and_then(|json| match serde_json::from_str::<Vec<LevelParams>>(&json) {
                Ok(levels) => Some(levels),
                Err(err) => {
                    log::warn!("Malformed level data, using defaults: {err}");
                    None
                }
            })
            .unwrap_or_default();
        merge_levels(remote)
    }

    fn load_profile() -> Option<PlayerProfile> {
        let json = read_json_tag("profile-data")?;
        match serde_json::from_str::<PlayerProfile>(&json) {
            Ok(profile) => {
                log::info!("Signed in as {}", profile.user_id);
                Some(profile)
            }
            Err(err) => {
                log::warn!("Malformed profile data, playing as guest: {err}");
                None
            }
        }
    }

    fn view_bounds(canvas: &HtmlCanvasElement) -> ViewBounds {
        ViewBounds {
            w: canvas.client_width() as f64,
            h: canvas.client_height() as f64,
        }
    }

    /// Size the backing store for the device pixel ratio and rescale the
    /// context so drawing stays in CSS pixels.
    fn fit_canvas(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let w = canvas.client_width() as f64;
        let h = canvas.client_height() as f64;
        canvas.set_width((w * dpr) as u32);
        canvas.set_height((h * dpr) as u32);
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Skydash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");
        fit_canvas(&canvas, &ctx);

        let levels = load_levels();
        let catalog = read_json_tag("asset-data")
            .map(|json| AssetCatalog::from_json(&json))
            .unwrap_or_default();
        let settings = Settings::load();
        let profile = load_profile();

        let renderer = Renderer::new(ctx, &catalog);

        // Decode barrier: every required image must be ready before the
        // round leaves its loading state. A failed decode keeps the
        // loading indicator up.
        for img in renderer.required_images() {
            if let Err(err) = JsFuture::from(img.decode()).await {
                log::error!("Required image failed to decode ({}): {err:?}", img.src());
                if let Some(el) = document.get_element_by_id("loading") {
                    el.set_text_content(Some("Failed to load game assets"));
                }
                return;
            }
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let audio = AudioPlayer::new(&catalog, &settings);
        let seed = js_sys::Date::now() as u64;
        // The embedding page may preselect a mode via data-mode
        let mode = canvas
            .get_attribute("data-mode")
            .and_then(|m| GameMode::from_str(&m))
            .unwrap_or_default();
        let state = GameState::new(seed, mode, view_bounds(&canvas), catalog.skin_count());
        log::info!("Game initialized with seed: {seed}, mode: {}", mode.as_str());

        let game = Rc::new(RefCell::new(Game {
            state,
            renderer,
            audio,
            level_id: levels[0].id.clone(),
            levels,
            settings,
            profile,
            outbox: Outbox::new(),
            board: LocalBoard::load(),
            high_score: highscores::load_high_score(),
            input: TickInput::default(),
            countdown_handle: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        let frames = FrameHandle::default();
        setup_input_handlers(&canvas, game.clone());
        setup_resize_handler(&canvas, game.clone());
        setup_visibility_handler(game.clone(), frames.clone());

        request_animation_frame(game, frames);

        log::info!("Skydash running!");
    }

    /// First tap/keypress from `Ready` or `Over` starts a round; the same
    /// press also counts as the first jump.
    fn press(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        if g.state.phase != RoundPhase::Playing {
            g.state.begin_round();
            g.audio.start_music();
            if g.state.mode == GameMode::TimeAttack {
                drop(g);
                start_countdown(game);
                g = game.borrow_mut();
            }
        }
        g.input.jump = true;
    }

    /// TimeAttack's one-second countdown runs on a wall-clock interval,
    /// decoupled from the frame loop.
    fn start_countdown(game: &Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let tick_game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            tick_game.borrow_mut().state.countdown_second();
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1000,
        ) {
            Ok(handle) => {
                let mut g = game.borrow_mut();
                g.clear_countdown();
                g.countdown_handle = Some(handle);
            }
            Err(err) => log::error!("Failed to start countdown interval: {err:?}"),
        }
        closure.forget();
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer (mouse/touch unified)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                press(&game);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " | "Enter" | "ArrowUp" => {
                        event.prevent_default();
                        press(&game);
                    }
                    "m" | "M" => game.borrow_mut().cycle_mode(),
                    digit @ ("1" | "2" | "3" | "4") => {
                        // Keys 1-4 select a level slot
                        let index = digit.parse::<usize>().unwrap_or(1) - 1;
                        game.borrow_mut().select_level(index);
                    }
                    "w" | "W" => {
                        let g = &mut *game.borrow_mut();
                        g.settings.weather_enabled = !g.settings.weather_enabled;
                        g.settings.save();
                        log::info!(
                            "Weather {}",
                            if g.settings.weather_enabled { "on" } else { "off" }
                        );
                    }
                    "f" | "F" => {
                        let g = &mut *game.borrow_mut();
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    key @ ("-" | "_" | "=" | "+") => {
                        let delta = if matches!(key, "-" | "_") { -0.1 } else { 0.1 };
                        let g = &mut *game.borrow_mut();
                        g.settings.master_volume =
                            (g.settings.master_volume + delta).clamp(0.0, 1.0);
                        g.settings.save();
                        g.audio.apply_settings(&g.settings);
                        log::info!("Master volume: {:.1}", g.settings.master_volume);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let ctx: Option<CanvasRenderingContext2d> = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into().ok());
            if let Some(ctx) = ctx {
                fit_canvas(&canvas, &ctx);
            }
            // Mid-round the next tick clamps to the new bounds; idle
            // rounds reset into the new coordinate space.
            game.borrow_mut().state.resize(view_bounds(&canvas));
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Hidden tabs stop scheduling frames entirely; the sim freezes with
    /// them since nothing ticks without a frame.
    fn setup_visibility_handler(game: Rc<RefCell<Game>>, frames: FrameHandle) {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("no document");
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                frames.cancel();
                frames.cancel(); // double-cancel must stay a no-op
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
                log::info!("Tab hidden, frame loop stopped");
            } else {
                {
                    let mut g = game.borrow_mut();
                    g.audio.set_muted(false);
                }
                if !frames.is_scheduled() {
                    request_animation_frame(game.clone(), frames.clone());
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, frames: FrameHandle) {
        let window = web_sys::window().expect("no window");
        let frames_for_loop = frames.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, frames_for_loop, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => frames.store(id),
            Err(err) => log::error!("Failed to schedule frame: {err:?}"),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, frames: FrameHandle, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            let g = &*g;
            g.renderer.draw(&g.state, &g.settings);
            g.update_hud();
        }
        request_animation_frame(game, frames);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use skydash::levels::{GameMode, default_levels};
    use skydash::sim::{GameState, RoundPhase, TickInput, ViewBounds, tick};

    env_logger::init();
    log::info!("Skydash (native) starting...");
    log::info!("Run with `trunk serve` for the web version; native mode runs a headless demo");

    let levels = default_levels();
    let level = &levels[0];
    let mut state = GameState::new(42, GameMode::Classic, ViewBounds { w: 800.0, h: 600.0 }, 1);
    state.begin_round();

    // Crude autopilot: flap whenever we sink past the midline
    let mut frames = 0u32;
    while state.phase == RoundPhase::Playing && frames < 36_000 {
        let jump = state.player.y + state.player.h > 360.0 && state.player.vel > 0.0;
        tick(&mut state, &TickInput { jump }, level);
        frames += 1;
    }

    println!(
        "Demo round over after {} frames: score {}, coins {}",
        frames, state.score, state.coins
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
