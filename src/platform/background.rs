//! Full-page starfield behind the hub content

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::renderer::web::WebCanvas;
use crate::sim::Starfield;

const CANVAS_ID: &str = "immersive-hub-canvas";
const CANVAS_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
     z-index: -1; pointer-events: none;";

/// Animated starfield canvas
pub struct StarfieldBackground {
    canvas: WebCanvas,
    field: Starfield,
}

fn viewport() -> Option<(u32, u32)> {
    let window = web_sys::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w as u32, h as u32))
}

impl StarfieldBackground {
    /// Add the canvas to the page and start animating
    ///
    /// Failures are logged and leave the page untouched.
    pub fn mount(seed: u64) {
        if let Err(e) = Self::try_mount(seed) {
            log::warn!("Starfield disabled: {:?}", e);
        }
    }

    fn try_mount(seed: u64) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let (width, height) = viewport().ok_or_else(|| JsValue::from_str("no viewport"))?;

        let element: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        element.set_id(CANVAS_ID);
        element.set_attribute("style", CANVAS_STYLE)?;
        body.append_child(&element)?;

        let canvas = WebCanvas::new(element, width, height)
            .ok_or_else(|| JsValue::from_str("no 2d context"))?;
        let background = Rc::new(RefCell::new(Self {
            canvas,
            field: Starfield::new(width as f32, height as f32, seed),
        }));

        {
            let background = background.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some((w, h)) = viewport() {
                    background.borrow_mut().resize(w, h);
                }
            });
            web_sys::window()
                .ok_or_else(|| JsValue::from_str("no window"))?
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        request_frame(background);
        log::info!("Starfield mounted ({}x{})", width, height);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.element.set_width(width);
        self.canvas.element.set_height(height);
        self.field.resize(width as f32, height as f32);
    }

    fn frame(&mut self) {
        self.field.update();
        self.field.draw(&mut self.canvas);
    }
}

fn request_frame(background: Rc<RefCell<StarfieldBackground>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |_time: f64| {
        background.borrow_mut().frame();
        request_frame(background);
    });
    if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        log::warn!("Starfield frame not scheduled: {:?}", e);
    }
    closure.forget();
}
