/// `Page` implementation over the live document
use crate::config::{
    CONTROL_BUTTON_CLASS, CONTROL_CLASS, CONTROL_CLOSE_CLASS, CONTROL_COUNTDOWN_CLASS,
    CONTROL_FLOATING_CLASS, CONTROL_TEXT_CLASS, HIDDEN_CLASS, MODAL_BUTTON_CLASS, MODAL_CLASS,
    MODAL_CONTENT_CLASS,
};
use crate::error::{ExtensionError, Result};
use crate::page::{Anchor, HideStrategy, Page, Target};
use crate::toggle::{ControlView, Placement, Palette};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, HtmlMediaElement, MouseEvent, Window};

const CONTROL_GROUP_ATTR: &str = "data-group";
const PALETTE_ATTR: &str = "data-palette";
const MEDIA_SELECTOR: &str = "video, audio";

pub struct DomPage {
    document: Document,
    on_toggle: Rc<dyn Fn(String)>,
}

impl DomPage {
    /// `on_toggle` receives the control key whenever a toggle button is clicked
    pub fn new(document: Document, on_toggle: Rc<dyn Fn(String)>) -> Self {
        DomPage { document, on_toggle }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn select(&self, target: &Target) -> Vec<HtmlElement> {
        let matches = query_all(&self.document, target.selector)
            .into_iter()
            .filter(|element| match target.contains {
                Some(inner) => element.query_selector(inner).ok().flatten().is_some(),
                None => true,
            })
            .filter(|element| {
                !target
                    .exclude_within
                    .iter()
                    .any(|outer| element.closest(outer).ok().flatten().is_some())
            })
            .filter_map(|element| element.dyn_into::<HtmlElement>().ok());

        if target.first_only {
            matches.take(1).collect()
        } else {
            matches.collect()
        }
    }

    fn anchor_container(&self, anchor: &Anchor) -> Option<Element> {
        self.document
            .query_selector(anchor.selector)
            .ok()
            .flatten()?
            .closest(anchor.closest)
            .ok()
            .flatten()
    }

    fn find_control(&self, key: &str) -> Option<HtmlElement> {
        let selector = format!(".{}[{}=\"{}\"]", CONTROL_CLASS, CONTROL_GROUP_ATTR, key);
        self.document
            .query_selector(&selector)
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn build_control(&self, key: &str, view: &ControlView) -> Result<HtmlElement> {
        let container = create(&self.document, "div", CONTROL_CLASS)?;
        container
            .set_attribute(CONTROL_GROUP_ATTR, key)
            .map_err(ExtensionError::dom)?;

        let close = create(&self.document, "div", CONTROL_CLOSE_CLASS)?;
        close.set_text_content(Some("×"));
        let button = create(&self.document, "button", CONTROL_BUTTON_CLASS)?;
        let text = create(&self.document, "p", CONTROL_TEXT_CLASS)?;
        let countdown = create(&self.document, "p", CONTROL_COUNTDOWN_CLASS)?;
        for child in [&close, &button, &text, &countdown] {
            container.append_child(child).map_err(ExtensionError::dom)?;
        }

        // Dismissing keeps the container in the document so it isn't recreated
        let dismissed = container.clone();
        let on_close = Closure::wrap(Box::new(move |event: MouseEvent| {
            event.stop_propagation();
            set_style(&dismissed, "display", "none");
        }) as Box<dyn Fn(MouseEvent)>);
        close.set_onclick(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        let on_toggle = Rc::clone(&self.on_toggle);
        let key = key.to_string();
        let on_click = Closure::wrap(Box::new(move |_: MouseEvent| {
            on_toggle(key.clone());
        }) as Box<dyn Fn(MouseEvent)>);
        button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
        on_click.forget();

        render_control(&container, view);
        Ok(container)
    }

    fn try_insert_control(
        &self,
        key: &str,
        placement: &Placement,
        near: &Target,
        view: &ControlView,
    ) -> Result<()> {
        let container = self.build_control(key, view)?;

        let inserted = match placement {
            Placement::BeforeFirstMatch => match self.select(near).first() {
                Some(first) => first.before_with_node_1(&container).is_ok(),
                None => false,
            },
            Placement::After(anchor) => match self.anchor_container(anchor) {
                Some(target) => target.after_with_node_1(&container).is_ok(),
                None => false,
            },
            Placement::Floating => false,
        };
        if inserted {
            return Ok(());
        }

        container
            .class_list()
            .add_1(CONTROL_FLOATING_CLASS)
            .map_err(ExtensionError::dom)?;
        let body = self
            .document
            .body()
            .ok_or_else(|| ExtensionError::Dom("document has no body".to_string()))?;
        body.append_child(&container).map_err(ExtensionError::dom)?;
        Ok(())
    }
}

impl Page for DomPage {
    fn count(&self, target: &Target) -> usize {
        self.select(target).len()
    }

    fn present(&self, target: &Target, strategy: HideStrategy, hidden: bool) -> usize {
        self.select(target)
            .iter()
            .filter(|element| apply_presentation(element, strategy, hidden))
            .count()
    }

    fn silence_media(&self, target: &Target, silenced: bool) {
        for element in self.select(target) {
            for media in media_within(&element) {
                if silenced {
                    if !media.paused() {
                        if let Err(e) = media.pause() {
                            log::debug!("Failed to pause media: {:?}", e);
                        }
                    }
                    if !media.muted() {
                        media.set_muted(true);
                    }
                } else if media.muted() {
                    media.set_muted(false);
                }
            }
        }
    }

    fn force_visible(&self, anchor: &Anchor) {
        if let Some(container) = self
            .anchor_container(anchor)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        {
            apply_presentation(&container, HideStrategy::InlineDisplayNone, false);
        }
    }

    fn click_if_attribute(&self, selector: &str, attribute: &str, value: &str) -> bool {
        let Some(element) = self.document.query_selector(selector).ok().flatten() else {
            return false;
        };
        if element.get_attribute(attribute).as_deref() != Some(value) {
            return false;
        }
        match element.dyn_into::<HtmlElement>() {
            Ok(element) => {
                element.click();
                true
            }
            Err(_) => false,
        }
    }

    fn has_control(&self, key: &str) -> bool {
        self.find_control(key).is_some()
    }

    fn insert_control(&self, key: &str, placement: &Placement, near: &Target, view: &ControlView) -> bool {
        match self.try_insert_control(key, placement, near, view) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to insert control {}: {}", key, e);
                false
            }
        }
    }

    fn update_control(&self, key: &str, view: &ControlView) {
        if let Some(container) = self.find_control(key) {
            render_control(&container, view);
        }
    }

    fn remove_controls(&self) -> usize {
        let controls = query_all(&self.document, &format!(".{}", CONTROL_CLASS));
        for control in &controls {
            control.remove();
        }
        controls.len()
    }
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(e) => {
            log::debug!("Invalid selector {}: {:?}", selector, e);
            Vec::new()
        }
    }
}

/// The element itself when it is a media element, plus any media inside it
fn media_within(element: &HtmlElement) -> Vec<HtmlMediaElement> {
    let mut media = Vec::new();
    if let Some(own) = element.dyn_ref::<HtmlMediaElement>() {
        media.push(own.clone());
    }
    if let Ok(list) = element.query_selector_all(MEDIA_SELECTOR) {
        media.extend(
            (0..list.length())
                .filter_map(|index| list.item(index))
                .filter_map(|node| node.dyn_into::<HtmlMediaElement>().ok()),
        );
    }
    media
}

fn create(document: &Document, tag: &str, class: &str) -> Result<HtmlElement> {
    let element = document
        .create_element(tag)
        .map_err(ExtensionError::dom)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| ExtensionError::Dom(format!("<{}> is not an HTML element", tag)))?;
    element.set_class_name(class);
    Ok(element)
}

/// Only touches the element when its presentation differs; returns whether it changed
fn apply_presentation(element: &HtmlElement, strategy: HideStrategy, hidden: bool) -> bool {
    let classes = element.class_list();
    let has_class = classes.contains(HIDDEN_CLASS);
    let display_none = element
        .style()
        .get_property_value("display")
        .is_ok_and(|display| display == "none");

    match (strategy, hidden) {
        (HideStrategy::CssClass, true) if !has_class => classes.add_1(HIDDEN_CLASS).is_ok(),
        (HideStrategy::InlineDisplayNone, true) if !display_none => {
            element.style().set_property("display", "none").is_ok()
        }
        (_, true) => false,
        (_, false) => {
            let mut changed = false;
            if has_class {
                changed |= classes.remove_1(HIDDEN_CLASS).is_ok();
            }
            if display_none {
                changed |= element.style().remove_property("display").is_ok();
            }
            changed
        }
    }
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let style = element.style();
    if style.get_property_value(property).ok().as_deref() != Some(value) {
        if let Err(e) = style.set_property(property, value) {
            log::debug!("Failed to set {}: {:?}", property, e);
        }
    }
}

fn set_text(element: &Element, text: &str) {
    if element.text_content().as_deref() != Some(text) {
        element.set_text_content(Some(text));
    }
}

fn child(container: &HtmlElement, class: &str) -> Option<HtmlElement> {
    container
        .query_selector(&format!(".{}", class))
        .ok()
        .flatten()?
        .dyn_into::<HtmlElement>()
        .ok()
}

/// Text changes are child-list mutations, so unchanged values are never rewritten
fn render_control(container: &HtmlElement, view: &ControlView) {
    if let Some(button) = child(container, CONTROL_BUTTON_CLASS) {
        set_text(&button, view.label);
    }
    if let Some(text) = child(container, CONTROL_TEXT_CLASS) {
        set_text(&text, view.status);
    }
    if let Some(countdown) = child(container, CONTROL_COUNTDOWN_CLASS) {
        set_text(&countdown, &view.countdown);
        if view.countdown_visible {
            if let Err(e) = countdown.style().remove_property("display") {
                log::debug!("Failed to show countdown: {:?}", e);
            }
        } else {
            set_style(&countdown, "display", "none");
        }
    }

    if container.get_attribute(PALETTE_ATTR).as_deref() != Some(view.palette.background) {
        apply_palette(container, view.palette);
    }
}

fn apply_palette(container: &HtmlElement, palette: Palette) {
    set_style(container, "background-color", palette.background);
    for class in [CONTROL_TEXT_CLASS, CONTROL_COUNTDOWN_CLASS] {
        if let Some(element) = child(container, class) {
            set_style(&element, "color", palette.text);
        }
    }
    if let Some(button) = child(container, CONTROL_BUTTON_CLASS) {
        set_style(&button, "color", palette.accent);
        set_style(&button, "border-color", palette.accent);
    }
    if let Err(e) = container.set_attribute(PALETTE_ATTR, palette.background) {
        log::debug!("Failed to tag palette: {:?}", e);
    }
}

/// Whether the browser reports a dark colour scheme
pub fn prefers_dark(window: &Window) -> bool {
    window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches())
}

/// Show the blocking "are you sure" modal and wait for an answer
pub async fn ask_confirmation(document: &Document, palette: Palette) -> bool {
    let promise = match show_modal(document, palette) {
        Ok(promise) => promise,
        Err(e) => {
            log::error!("Failed to show confirmation: {}", e);
            return false;
        }
    };
    match JsFuture::from(promise).await {
        Ok(answer) => answer.as_bool().unwrap_or(false),
        Err(e) => {
            log::warn!("Confirmation failed: {:?}", e);
            false
        }
    }
}

fn show_modal(document: &Document, palette: Palette) -> Result<js_sys::Promise> {
    let body = document
        .body()
        .ok_or_else(|| ExtensionError::Dom("document has no body".to_string()))?;

    let modal = create(document, "div", MODAL_CLASS)?;
    let content = create(document, "div", MODAL_CONTENT_CLASS)?;
    set_style(&content, "background-color", palette.background);
    let heading = create(document, "h2", "")?;
    heading.set_text_content(Some("Are you sure you actually want to show this content?"));
    set_style(&heading, "color", palette.text);
    let confirm = create(document, "button", MODAL_BUTTON_CLASS)?;
    confirm.set_text_content(Some("Yes, I'm sure"));
    let cancel = create(document, "button", MODAL_BUTTON_CLASS)?;
    cancel.set_text_content(Some("Honestly, no"));
    for button in [&confirm, &cancel] {
        set_style(button, "color", palette.accent);
        set_style(button, "border-color", palette.accent);
    }

    for element in [&heading, &confirm, &cancel] {
        content.append_child(element).map_err(ExtensionError::dom)?;
    }
    modal.append_child(&content).map_err(ExtensionError::dom)?;
    body.append_child(&modal).map_err(ExtensionError::dom)?;

    let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, _reject: js_sys::Function| {
        for (button, answer) in [(&confirm, true), (&cancel, false)] {
            let modal = modal.clone();
            let resolve = resolve.clone();
            let on_click = Closure::once_into_js(move || {
                modal.remove();
                if let Err(e) = resolve.call1(&JsValue::NULL, &JsValue::from_bool(answer)) {
                    log::debug!("Failed to resolve confirmation: {:?}", e);
                }
            });
            button.set_onclick(Some(on_click.unchecked_ref()));
        }
    });
    Ok(promise)
}
