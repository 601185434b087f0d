//! Arcade Kit entry point
//!
//! On the web this runs "Orb Catcher", a small click game built on the
//! kit. Natively it runs a headless walkthrough of the engine, the
//! achievement tracker and the offline cache.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    use arcade_kit::achievements::AchievementTracker;
    use arcade_kit::persistence::{KeyValueStore, LocalStorage, store_or_memory};
    use arcade_kit::platform::{
        self, DomAchievementList, FrameHandler, SharedEngine, StarfieldBackground,
    };
    use arcade_kit::renderer::Canvas;
    use arcade_kit::renderer::web::WebCanvas;
    use arcade_kit::sim::{
        Circle, EmitOptions, GameState, ParticleSystem, check_circle_collision, level_speed,
    };
    use arcade_kit::{GameEngine, SoundEffect, format_time};

    const HIGH_SCORE_KEY: &str = "orbCatcherHighScore";
    const CANVAS_ID: &str = "gameCanvas";
    const TIMER_ELEMENT: &str = "timer";
    const ROUND_SECONDS: i64 = 30;
    const ORB_RADIUS: f32 = 24.0;
    const ORB_POINTS: i64 = 10;
    /// Orb speed at level 1, pixels per millisecond
    const BASE_SPEED: f32 = 0.15;

    /// LocalStorage, or memory when the browser refuses it
    type Store = Box<dyn KeyValueStore>;

    /// Orb Catcher state
    struct OrbGame {
        canvas: WebCanvas,
        orb: Circle,
        heading: Vec2,
        rng: Pcg32,
    }

    impl OrbGame {
        fn new(canvas: WebCanvas, seed: u64) -> Self {
            let mut game = Self {
                canvas,
                orb: Circle::new(0.0, 0.0, ORB_RADIUS),
                heading: Vec2::X,
                rng: Pcg32::seed_from_u64(seed),
            };
            game.respawn();
            game
        }

        fn respawn(&mut self) {
            let (w, h) = (self.canvas.width(), self.canvas.height());
            self.orb.center = Vec2::new(
                self.rng.random_range(ORB_RADIUS..w - ORB_RADIUS),
                self.rng.random_range(ORB_RADIUS..h - ORB_RADIUS),
            );
            self.heading = Vec2::from_angle(self.rng.random_range(0.0..std::f32::consts::TAU));
        }

        fn hit(&self, pos: Vec2) -> bool {
            check_circle_collision(&self.orb, &Circle::new(pos.x, pos.y, 1.0))
        }
    }

    impl FrameHandler for OrbGame {
        fn update(&mut self, state: &mut GameState, delta_ms: f64) {
            let speed = level_speed(BASE_SPEED, state.level);
            self.orb.center += self.heading * speed * delta_ms as f32;

            let (w, h) = (self.canvas.width(), self.canvas.height());
            let c = &mut self.orb.center;
            if c.x < ORB_RADIUS || c.x > w - ORB_RADIUS {
                self.heading.x = -self.heading.x;
                c.x = c.x.clamp(ORB_RADIUS, w - ORB_RADIUS);
            }
            if c.y < ORB_RADIUS || c.y > h - ORB_RADIUS {
                self.heading.y = -self.heading.y;
                c.y = c.y.clamp(ORB_RADIUS, h - ORB_RADIUS);
            }

            if state.score >= state.level as i64 * 100 {
                let level = state.next_level();
                log::info!("Level {}", level);
            }
        }

        fn draw(&mut self, _state: &GameState, particles: &ParticleSystem) {
            self.canvas.clear();
            self.canvas
                .fill_circle(self.orb.center, self.orb.radius, "#6c63ff", 1.0);
            particles.draw(&mut self.canvas);
        }
    }

    /// Everything the page's callbacks share
    struct App {
        engine: SharedEngine<Store>,
        game: Rc<RefCell<OrbGame>>,
        achievements: RefCell<AchievementTracker<Store>>,
    }

    fn start_round(app: Rc<App>) {
        app.engine.borrow_mut().reset();
        app.game.borrow_mut().respawn();
        if !platform::start_loop(app.engine.clone(), app.game.clone()) {
            return;
        }

        platform::set_text(TIMER_ELEMENT, &format_time(ROUND_SECONDS as f64));
        let done = app.clone();
        let started = platform::start_round_countdown(
            app.engine.clone(),
            ROUND_SECONDS,
            |remaining| platform::set_text(TIMER_ELEMENT, &format_time(remaining as f64)),
            move || end_round(done.clone()),
        );
        if let Err(e) = started {
            log::warn!("Countdown unavailable: {:?}", e);
        }
    }

    fn end_round(app: Rc<App>) {
        platform::stop_loop(&app.engine);

        let (screen, score) = {
            let mut engine = app.engine.borrow_mut();
            let score = engine.state().score;
            let submission = engine.save_high_score(HIGH_SCORE_KEY, None);
            if let Err(e) = submission.saved {
                log::warn!("High score not saved: {}", e);
            }
            (engine.game_over_screen(submission.new_record), score)
        };
        platform::update_hud(app.engine.borrow().state());

        {
            let mut achievements = app.achievements.borrow_mut();
            for report in [achievements.increment_games(), achievements.add_score_delta(score)] {
                for id in report.unlocked {
                    log::info!("Unlocked: {}", id.title());
                }
            }
        }

        let restart = app.clone();
        if let Err(e) = platform::show_overlay(&screen, move |_button| start_round(restart.clone())) {
            log::warn!("Could not show game over screen: {:?}", e);
        }
    }

    fn setup_click_handler(app: Rc<App>) {
        let element = app.game.borrow().canvas.element.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut engine = app.engine.borrow_mut();
            if !engine.state().running || engine.state().paused {
                return;
            }
            let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
            let mut game = app.game.borrow_mut();
            if game.hit(pos) {
                engine.state_mut().add_score(ORB_POINTS);
                engine.emit_particles(game.orb.center, &EmitOptions::default());
                engine.play(SoundEffect::Score);
                game.respawn();
            } else {
                engine.play(SoundEffect::Click);
            }
        });
        if let Err(e) = element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref()) {
            log::warn!("Click handler not attached: {:?}", e);
        }
        closure.forget();
    }

    /// P or Escape toggles pause during a round
    fn setup_pause_key(engine: SharedEngine<Store>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if !matches!(event.key().as_str(), "p" | "P" | "Escape") {
                return;
            }
            let mut engine = engine.borrow_mut();
            if !engine.state().running {
                return;
            }
            let paused = engine.toggle_pause();
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        });
        if let Err(e) = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref()) {
            log::warn!("Pause key not attached: {:?}", e);
        }
        closure.forget();
    }

    fn setup_audio_unlock(engine: SharedEngine<Store>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        // Browsers only allow an AudioContext after a user gesture
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Err(e) = engine.borrow_mut().audio_mut().init() {
                log::warn!("Audio unavailable: {}", e);
            }
        });
        if let Err(e) = document.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref()) {
            log::warn!("Audio unlock not attached: {:?}", e);
        }
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Orb Catcher starting...");

        let seed = js_sys::Date::now() as u64;
        let mut engine = GameEngine::new(store_or_memory(LocalStorage::open()), seed);
        engine.load_high_score(HIGH_SCORE_KEY);
        platform::update_hud(engine.state());

        let size = engine.size();
        let Some(canvas) = WebCanvas::by_id(CANVAS_ID, size.x as u32, size.y as u32) else {
            log::warn!("No #{} canvas on this page", CANVAS_ID);
            return;
        };

        if engine.settings().effective_starfield() {
            StarfieldBackground::mount(seed);
        }

        let mut achievements =
            AchievementTracker::new(store_or_memory(LocalStorage::open()))
                .with_view(Box::new(DomAchievementList::default()));
        if let Err(e) = achievements.init() {
            log::warn!("Achievements not persisted: {}", e);
        }

        let engine: SharedEngine<Store> = Rc::new(RefCell::new(engine));
        let app = Rc::new(App {
            engine: engine.clone(),
            game: Rc::new(RefCell::new(OrbGame::new(canvas, seed.wrapping_add(1)))),
            achievements: RefCell::new(achievements),
        });

        setup_audio_unlock(engine.clone());
        setup_click_handler(app.clone());
        setup_pause_key(engine.clone());
        if let Err(e) = platform::setup_auto_pause(engine) {
            log::warn!("Auto-pause unavailable: {:?}", e);
        }

        log::info!("Orb Catcher initialized with seed: {}", seed);
        start_round(app);
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
    log::info!("Arcade Kit (native) starting...");
    log::info!("The browser build runs with `trunk serve`; this is a headless walkthrough");

    run_engine_demo();
    run_achievement_demo();
    run_cache_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn run_engine_demo() {
    use arcade_kit::GameEngine;
    use arcade_kit::persistence::MemoryStore;
    use arcade_kit::renderer::{Canvas, RecordingCanvas};
    use arcade_kit::sim::EmitOptions;
    use glam::Vec2;

    println!("\nEngine: 3 seconds at 60 fps");
    let mut engine = GameEngine::new(MemoryStore::new(), 42);
    let mut canvas = RecordingCanvas::new(800.0, 500.0);
    engine.start();

    for frame in 0..180u32 {
        let t = frame as f64 * 1000.0 / 60.0;
        if frame % 30 == 0 {
            engine.emit_particles(Vec2::new(400.0, 250.0), &EmitOptions::default());
        }
        if frame == 90 {
            engine.toggle_pause();
        }
        if frame == 120 {
            engine.toggle_pause();
        }
        engine.frame(
            t,
            |state, _dt| state.add_score(1),
            |_state, particles| {
                canvas.clear();
                particles.draw(&mut canvas);
            },
        );
    }

    let record = engine.save_high_score("demo-high", None);
    println!(
        "  score {} (new record: {}), particles alive {}, circles last frame {}",
        engine.state().score,
        record.new_record,
        engine.particles().len(),
        canvas.circle_count()
    );
    engine.stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn run_achievement_demo() {
    use arcade_kit::AchievementTracker;
    use arcade_kit::persistence::MemoryStore;

    println!("\nAchievements: five games, 120 points");
    let mut tracker = AchievementTracker::new(MemoryStore::new());
    if let Err(e) = tracker.init() {
        log::warn!("Achievements not persisted: {}", e);
    }

    for game in 1..=5 {
        let report = tracker.increment_games();
        for id in report.unlocked {
            println!("  game {}: unlocked {}", game, id.title());
        }
        let report = tracker.add_score_delta(24);
        for id in report.unlocked {
            println!("  game {}: unlocked {}", game, id.title());
        }
    }
    for item in tracker.items() {
        println!("  {}", item.line());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_cache_demo() {
    use arcade_kit::cache::{CacheManifest, CacheWorker, MemoryCache, StaticNetwork};

    println!("\nOffline cache");
    let manifest = CacheManifest::default();
    let network = manifest
        .urls
        .iter()
        .fold(StaticNetwork::new(), |net, url| net.with_page(url, url));
    let worker = CacheWorker::new(manifest, MemoryCache::new(), network);

    match pollster::block_on(worker.install()) {
        Ok(count) => println!("  installed {} resources", count),
        Err(e) => println!("  install failed: {}", e),
    }

    worker.network().set_online(false);
    for url in ["./game3.html", "./game12.html"] {
        match pollster::block_on(worker.handle_fetch(url)) {
            Ok(served) => println!(
                "  {} -> {} {:?}",
                url, served.response.status, served.outcome
            ),
            Err(e) => println!("  {} -> error: {}", url, e),
        }
    }
}
