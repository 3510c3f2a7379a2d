/// Content-script runtime: wires browser triggers to the visibility controller
///
/// Every trigger (mutations, the fallback interval, storage changes, the
/// background's `pageChanged` message) re-reads the location and reconciles.
/// The controller sits in a `RefCell`; triggers that find it borrowed skip
/// their pass, the next trigger catches up.
use crate::bridge;
use crate::config::{COUNTDOWN_TICK_MS, RECONCILE_INTERVAL_MS};
use crate::controller::{Phase, ToggleOutcome, VisibilityController};
use crate::dom::{self, DomPage};
use crate::messages::{Ack, ExtMessage};
use crate::prefs::{PreferenceChange, StoredPreferences};
use crate::site::PageLocation;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{MutationObserver, MutationObserverInit, Window};

/// A running `setInterval`, cleared on drop
struct IntervalHandle {
    window: Window,
    id: i32,
}

impl IntervalHandle {
    fn start(window: &Window, callback: &js_sys::Function, period_ms: i32) -> Option<IntervalHandle> {
        match window.set_interval_with_callback_and_timeout_and_arguments_0(callback, period_ms) {
            Ok(id) => Some(IntervalHandle {
                window: window.clone(),
                id,
            }),
            Err(e) => {
                log::error!("Failed to start interval: {:?}", e);
                None
            }
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.id);
    }
}

pub struct ContentScript {
    window: Window,
    controller: RefCell<VisibilityController<DomPage>>,
    /// Set once stored preferences are applied; triggers are ignored before that
    ready: Cell<bool>,
    countdown: RefCell<Option<IntervalHandle>>,
    /// Countdown tick callback, created once and reused for every reveal
    tick: js_sys::Function,
}

fn current_location(window: &Window) -> Option<PageLocation> {
    window
        .location()
        .href()
        .ok()
        .and_then(|href| PageLocation::parse(&href))
}

impl ContentScript {
    fn new(window: Window, location: PageLocation) -> Option<Rc<ContentScript>> {
        let document = window.document()?;
        let prefers_dark = dom::prefers_dark(&window);

        Some(Rc::new_cyclic(|weak: &Weak<ContentScript>| {
            let on_toggle = {
                let weak = weak.clone();
                Rc::new(move |key: String| {
                    if let Some(script) = weak.upgrade() {
                        script.toggle(key);
                    }
                }) as Rc<dyn Fn(String)>
            };
            let page = DomPage::new(document, on_toggle);
            let controller = VisibilityController::new(page, location).with_system_dark(prefers_dark);

            let weak = weak.clone();
            let tick = Closure::wrap(Box::new(move || {
                if let Some(script) = weak.upgrade() {
                    script.tick();
                }
            }) as Box<dyn Fn()>)
            .into_js_value()
            .unchecked_into::<js_sys::Function>();

            ContentScript {
                window,
                controller: RefCell::new(controller),
                ready: Cell::new(false),
                countdown: RefCell::new(None),
                tick,
            }
        }))
    }

    fn install(self: &Rc<Self>) {
        {
            let script = Rc::clone(self);
            spawn_local(async move {
                let prefs = match bridge::load_preferences().await {
                    Ok(prefs) => prefs,
                    Err(e) => {
                        log::error!("Failed to load preferences, using defaults: {}", e);
                        StoredPreferences::default()
                    }
                };
                script.apply_preferences(&prefs);
            });
        }

        self.observe_mutations();

        {
            let script = Rc::clone(self);
            let refresh = Closure::wrap(Box::new(move || script.refresh()) as Box<dyn Fn()>);
            if let Err(e) = self
                .window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    refresh.as_ref().unchecked_ref(),
                    RECONCILE_INTERVAL_MS,
                )
            {
                log::error!("Failed to start reconcile interval: {:?}", e);
            }
            refresh.forget();
        }

        {
            let script = Rc::clone(self);
            bridge::on_settings_changed(move |changes| script.on_changes(changes));
        }

        {
            let script = Rc::clone(self);
            bridge::on_runtime_message(move |message| match message {
                ExtMessage::PageChanged => {
                    script.refresh();
                    Some(Ack::received())
                }
            });
        }
    }

    fn observe_mutations(self: &Rc<Self>) {
        let Some(root) = self.window.document().and_then(|document| document.document_element()) else {
            log::warn!("No document element to observe");
            return;
        };

        let script = Rc::clone(self);
        let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
            script.refresh();
        }) as Box<dyn Fn(js_sys::Array, MutationObserver)>);

        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                log::error!("Failed to create mutation observer: {:?}", e);
                return;
            }
        };
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        if let Err(e) = observer.observe_with_options(&root, &options) {
            log::error!("Failed to observe document: {:?}", e);
        }
        callback.forget();
    }

    fn apply_preferences(&self, prefs: &StoredPreferences) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.apply_preferences(prefs),
            Err(_) => {
                log::warn!("Controller busy while applying preferences");
                return;
            }
        }
        self.ready.set(true);
        log::info!("Preferences loaded");
        self.sync_countdown();
    }

    fn on_changes(&self, changes: Vec<PreferenceChange>) {
        if !self.ready.get() || changes.is_empty() {
            return;
        }
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.apply_changes(changes, current_location(&self.window));
        }
        self.sync_countdown();
    }

    /// Re-read the location and reconcile
    fn refresh(&self) {
        if !self.ready.get() {
            return;
        }
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return;
        };
        match current_location(&self.window) {
            Some(location) => {
                controller.navigate(location);
            }
            None => {
                controller.reconcile();
            }
        }
    }

    fn toggle(self: Rc<Self>, key: String) {
        let outcome = match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.request_toggle(&key),
            Err(_) => return,
        };

        match outcome {
            ToggleOutcome::NeedsConfirmation => {
                let Ok((document, palette)) = self
                    .controller
                    .try_borrow()
                    .map(|controller| (controller.page().document().clone(), controller.palette()))
                else {
                    return;
                };
                spawn_local(async move {
                    // No borrow is held while the prompt is open
                    let confirmed = dom::ask_confirmation(&document, palette).await;
                    if let Ok(mut controller) = self.controller.try_borrow_mut() {
                        controller.confirm_reveal(&key, confirmed);
                    }
                    self.sync_countdown();
                });
            }
            ToggleOutcome::Hidden => self.sync_countdown(),
            ToggleOutcome::Ignored => {}
        }
    }

    fn tick(&self) {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.tick();
        }
        self.sync_countdown();
    }

    /// The countdown interval exists exactly while content is revealed
    fn sync_countdown(&self) {
        let revealed = match self.controller.try_borrow() {
            Ok(controller) => controller.phase() == Phase::Revealed,
            Err(_) => return,
        };
        let Ok(mut countdown) = self.countdown.try_borrow_mut() else {
            return;
        };
        match (revealed, countdown.is_some()) {
            (true, false) => *countdown = IntervalHandle::start(&self.window, &self.tick, COUNTDOWN_TICK_MS),
            (false, true) => *countdown = None,
            _ => {}
        }
    }
}

/// Start hiding on the current page; does nothing on unsupported sites
pub fn start() {
    let Some(window) = web_sys::window() else {
        log::error!("No window available");
        return;
    };
    let Some(location) = current_location(&window) else {
        log::warn!("Unreadable page location");
        return;
    };
    let Some(site) = location.site() else {
        log::debug!("{} is not a supported site", location.host);
        return;
    };

    log::info!("Escaping the algorithm on {}", site.label());
    match ContentScript::new(window, location) {
        Some(script) => script.install(),
        None => log::error!("No document available"),
    }
}
