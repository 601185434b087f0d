//! Browser glue
//!
//! Everything here touches the DOM, timers or worker globals and only
//! builds for `wasm32`. The logic it drives lives in the portable modules.

pub mod background;
pub mod dom;
pub mod frame;
pub mod service_worker;

pub use background::StarfieldBackground;
pub use dom::{DomAchievementList, set_text, show_overlay, update_hud};
pub use frame::{
    FrameHandler, SharedEngine, setup_auto_pause, start_countdown, start_loop,
    start_round_countdown, stop_loop,
};
