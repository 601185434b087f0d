//! Service worker event wiring
//!
//! The worker script loads this module and calls `start_service_worker`,
//! which hooks `install`, `fetch` and `activate` to a [`CacheWorker`].

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{ExtendableEvent, FetchEvent, ServiceWorkerGlobalScope};

use crate::cache::web::{WebCacheStorage, WebNetwork};
use crate::cache::{CacheError, CacheManifest, CacheWorker};

type WebWorker = CacheWorker<WebCacheStorage, WebNetwork>;

fn to_js(e: CacheError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Register the offline cache handlers on the worker global scope
#[wasm_bindgen]
pub fn start_service_worker() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // Already set if the page and worker share an instance
    let _ = console_log::init_with_level(log::Level::Info);

    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let storage = WebCacheStorage::from_scope(&scope).map_err(to_js)?;
    let manifest = CacheManifest::default();
    log::info!("Service worker starting (cache {})", manifest.name);
    let worker = Rc::new(CacheWorker::new(
        manifest,
        storage,
        WebNetwork::new(scope.clone()),
    ));

    on_install(&scope, worker.clone())?;
    on_fetch(&scope, worker.clone())?;
    on_activate(&scope, worker)?;
    Ok(())
}

fn on_install(scope: &ServiceWorkerGlobalScope, worker: Rc<WebWorker>) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: ExtendableEvent| {
        let worker = worker.clone();
        let promise = future_to_promise(async move {
            // Resolves even when pre-caching fails
            let count = worker.precache().await;
            Ok(JsValue::from_f64(count as f64))
        });
        if let Err(e) = event.wait_until(&promise) {
            log::warn!("install: waitUntil failed: {:?}", e);
        }
    });
    scope.add_event_listener_with_callback("install", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_fetch(scope: &ServiceWorkerGlobalScope, worker: Rc<WebWorker>) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: FetchEvent| {
        let request = event.request();
        // Non-GET requests go straight to the network
        if request.method() != "GET" {
            return;
        }

        let url = request.url();
        let worker = worker.clone();
        let promise = future_to_promise(async move {
            let served = worker.handle_fetch(&url).await.map_err(to_js)?;
            Ok(served.response.into())
        });
        if let Err(e) = event.respond_with(&promise) {
            log::warn!("fetch: respondWith failed: {:?}", e);
        }
    });
    scope.add_event_listener_with_callback("fetch", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_activate(scope: &ServiceWorkerGlobalScope, worker: Rc<WebWorker>) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: ExtendableEvent| {
        let worker = worker.clone();
        let promise = future_to_promise(async move {
            let deleted = worker.activate().await.map_err(to_js)?;
            Ok(JsValue::from_f64(deleted.len() as f64))
        });
        if let Err(e) = event.wait_until(&promise) {
            log::warn!("activate: waitUntil failed: {:?}", e);
        }
    });
    scope.add_event_listener_with_callback("activate", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
