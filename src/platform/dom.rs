//! DOM helpers: text displays, overlays and the achievement list

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, MouseEvent};

use crate::achievements::{AchievementItem, AchievementView};
use crate::sim::GameState;
use crate::ui::{self, ACHIEVEMENTS_LIST, OVERLAY_STYLE, Overlay, OverlayButton};

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// Set the text of element `id`; does nothing if it is missing
pub fn set_text(id: &str, text: &str) {
    if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
        el.set_text_content(Some(text));
    }
}

/// Refresh the score, high score and level displays
pub fn update_hud(state: &GameState) {
    for (id, text) in ui::hud_text(state) {
        set_text(id, &text);
    }
}

/// Add `overlay` to the page
///
/// Any overlay with the same id is replaced. Clicking one of its buttons
/// removes the overlay, then calls `on_button`.
pub fn show_overlay<O, F>(overlay: &O, on_button: F) -> Result<(), JsValue>
where
    O: Overlay,
    F: FnMut(OverlayButton) + 'static,
{
    let document = document().ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    if let Some(old) = document.get_element_by_id(overlay.element_id()) {
        old.remove();
    }

    let root = document.create_element("div")?;
    root.set_id(overlay.element_id());
    root.set_attribute("style", OVERLAY_STYLE)?;
    root.set_inner_html(&overlay.to_html());
    body.append_child(&root)?;

    let on_button = Rc::new(RefCell::new(on_button));
    for button in overlay.buttons() {
        let Some(el) = document.get_element_by_id(button.id()) else {
            log::warn!("Overlay button #{} missing", button.id());
            continue;
        };
        let root = root.clone();
        let on_button = on_button.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            root.remove();
            (&mut *on_button.borrow_mut())(button);
        });
        el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::info!("Showing #{}", overlay.element_id());
    Ok(())
}

/// Achievement rows rendered into a container element
pub struct DomAchievementList {
    container_id: String,
}

impl Default for DomAchievementList {
    fn default() -> Self {
        Self::new(ACHIEVEMENTS_LIST)
    }
}

impl DomAchievementList {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}

impl AchievementView for DomAchievementList {
    fn render(&mut self, items: &[AchievementItem]) {
        let Some(document) = document() else { return };
        let Some(list) = document.get_element_by_id(&self.container_id) else {
            return;
        };

        list.set_inner_html("");
        for item in items {
            let Ok(row) = document.create_element("div") else {
                continue;
            };
            row.set_class_name(if item.unlocked {
                "achievement unlocked"
            } else {
                "achievement locked"
            });
            row.set_text_content(Some(&item.line()));
            if let Err(e) = list.append_child(&row) {
                log::warn!("Could not render achievement row: {:?}", e);
            }
        }
    }
}
