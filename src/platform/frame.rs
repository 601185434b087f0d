//! Animation frame and timer drivers

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::engine::GameEngine;
use crate::persistence::KeyValueStore;
use crate::sim::{Countdown, GameState, ParticleSystem};

use super::dom::update_hud;

/// Engine handle shared between the frame callback and input handlers
pub type SharedEngine<S> = Rc<RefCell<GameEngine<S>>>;

/// Game-specific frame callbacks
pub trait FrameHandler {
    /// Advance the game by `delta_ms`; not called while paused
    fn update(&mut self, state: &mut GameState, delta_ms: f64);

    /// Draw the frame; called every frame, paused or not
    fn draw(&mut self, state: &GameState, particles: &ParticleSystem);

    /// Runs after each frame with full engine access (e.g. to stop on game over)
    fn after_frame<S: KeyValueStore>(&mut self, _engine: &mut GameEngine<S>) {}
}

/// Start the engine and its requestAnimationFrame chain
///
/// Returns false if the engine was already running.
pub fn start_loop<S, H>(engine: SharedEngine<S>, handler: Rc<RefCell<H>>) -> bool
where
    S: KeyValueStore + 'static,
    H: FrameHandler + 'static,
{
    if !engine.borrow_mut().start() {
        return false;
    }
    request_frame(engine, handler);
    true
}

/// Stop the engine and cancel its pending frame
pub fn stop_loop<S: KeyValueStore>(engine: &SharedEngine<S>) {
    let pending = engine.borrow_mut().stop();
    if let (Some(handle), Some(window)) = (pending, web_sys::window()) {
        if let Err(e) = window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }
}

fn request_frame<S, H>(engine: SharedEngine<S>, handler: Rc<RefCell<H>>)
where
    S: KeyValueStore + 'static,
    H: FrameHandler + 'static,
{
    let Some(window) = web_sys::window() else {
        return;
    };
    let shared = engine.clone();
    let closure = Closure::once(move |time: f64| {
        on_frame(shared, handler, time);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => engine.borrow_mut().game_loop_mut().set_pending_frame(handle),
        Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

fn on_frame<S, H>(engine: SharedEngine<S>, handler: Rc<RefCell<H>>, time: f64)
where
    S: KeyValueStore + 'static,
    H: FrameHandler + 'static,
{
    {
        let mut e = engine.borrow_mut();
        let ran = e.frame(
            time,
            |state, dt| handler.borrow_mut().update(state, dt),
            |state, particles| handler.borrow_mut().draw(state, particles),
        );
        if !ran {
            return;
        }
        handler.borrow_mut().after_frame(&mut *e);
        update_hud(e.state());
        if !e.game_loop().is_running() {
            return;
        }
    }

    request_frame(engine, handler);
}

/// Call `on_tick` with the seconds left once per second, then `on_complete`
///
/// Returns the interval id; pass it to `clearInterval` to cancel.
pub fn start_countdown<T, C>(seconds: i64, on_tick: T, on_complete: C) -> Result<i32, JsValue>
where
    T: FnMut(i64) + 'static,
    C: FnMut() + 'static,
{
    interval_countdown(seconds, || true, on_tick, on_complete)
}

/// Like [`start_countdown`], but seconds only count while `engine` is unpaused
pub fn start_round_countdown<S, T, C>(
    engine: SharedEngine<S>,
    seconds: i64,
    on_tick: T,
    on_complete: C,
) -> Result<i32, JsValue>
where
    S: KeyValueStore + 'static,
    T: FnMut(i64) + 'static,
    C: FnMut() + 'static,
{
    interval_countdown(
        seconds,
        move || !engine.borrow().state().paused,
        on_tick,
        on_complete,
    )
}

fn interval_countdown<P, T, C>(
    seconds: i64,
    should_tick: P,
    mut on_tick: T,
    mut on_complete: C,
) -> Result<i32, JsValue>
where
    P: Fn() -> bool + 'static,
    T: FnMut(i64) + 'static,
    C: FnMut() + 'static,
{
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let interval = Rc::new(Cell::new(None::<i32>));

    let closure = {
        let interval = interval.clone();
        let mut countdown = Countdown::new(seconds);
        Closure::<dyn FnMut()>::new(move || {
            if !should_tick() {
                return;
            }
            let Some(step) = countdown.tick_second() else {
                return;
            };
            on_tick(step.remaining);
            if step.finished {
                if let (Some(window), Some(id)) = (web_sys::window(), interval.get()) {
                    window.clear_interval_with_handle(id);
                }
                on_complete();
            }
        })
    };

    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        1000,
    )?;
    interval.set(Some(id));
    closure.forget();
    Ok(id)
}

/// Pause the engine when the tab is hidden and resume it when it comes back
///
/// Only a pause made here is undone; a player's own pause stays.
pub fn setup_auto_pause<S: KeyValueStore + 'static>(engine: SharedEngine<S>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let doc = document.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        let mut engine = engine.borrow_mut();
        match doc.visibility_state() {
            web_sys::VisibilityState::Hidden => {
                if engine.auto_pause() {
                    log::info!("Auto-paused (tab hidden)");
                }
            }
            _ => {
                if engine.auto_resume() {
                    log::info!("Resumed (tab visible)");
                }
            }
        }
    });
    document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
