/// The document operations the visibility controller needs
///
/// `DomPage` implements this against the live document. Unit tests use the
/// in-memory double in [`testing`].
use crate::toggle::{ControlView, Placement};

/// How a content group is marked as suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideStrategy {
    /// Adds the `hidden-by-extension` class (styled by content.css)
    CssClass,
    /// Sets `display: none` on the element itself
    InlineDisplayNone,
}

/// A selection of elements on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub selector: &'static str,
    /// Only keep elements that contain a match for this selector
    pub contains: Option<&'static str>,
    /// Only keep the first surviving element
    pub first_only: bool,
    /// Skip elements that sit inside a match for any of these selectors
    pub exclude_within: &'static [&'static str],
}

impl Target {
    pub const fn new(selector: &'static str) -> Target {
        Target {
            selector,
            contains: None,
            first_only: false,
            exclude_within: &[],
        }
    }

    pub const fn containing(self, inner: &'static str) -> Target {
        Target { contains: Some(inner), ..self }
    }

    pub const fn first(self) -> Target {
        Target { first_only: true, ..self }
    }

    pub const fn excluding(self, outer: &'static [&'static str]) -> Target {
        Target { exclude_within: outer, ..self }
    }
}

/// An element located by `selector`, widened to its closest `closest` ancestor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub selector: &'static str,
    pub closest: &'static str,
}

pub trait Page {
    /// Number of elements currently selected by `target`
    fn count(&self, target: &Target) -> usize;

    /// Apply (or clear) the hidden presentation; returns how many elements changed
    fn present(&self, target: &Target, strategy: HideStrategy, hidden: bool) -> usize;

    /// Pause and mute media inside the selection, or unmute it again
    fn silence_media(&self, target: &Target, silenced: bool);

    /// Undo any inline hiding on the anchor's container
    fn force_visible(&self, anchor: &Anchor);

    /// Click the first element matching `selector` if `attribute` currently equals `value`
    fn click_if_attribute(&self, selector: &str, attribute: &str, value: &str) -> bool;

    fn has_control(&self, key: &str) -> bool;

    /// Insert a toggle control tagged with `key`; `near` locates in-flow placements
    fn insert_control(&self, key: &str, placement: &Placement, near: &Target, view: &ControlView) -> bool;

    fn update_control(&self, key: &str, view: &ControlView);

    /// Remove every toggle control; returns how many were removed
    fn remove_controls(&self) -> usize;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct FakeVideo {
        pub paused: bool,
        pub muted: bool,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct FakeElement {
        pub hidden_class: bool,
        pub display_none: bool,
        /// Selectors that match one of this element's descendants
        pub descendants: Vec<&'static str>,
        /// Selectors that match one of this element's ancestors
        pub ancestors: Vec<&'static str>,
        pub videos: Vec<FakeVideo>,
    }

    impl FakeElement {
        pub fn is_hidden(&self) -> bool {
            self.hidden_class || self.display_none
        }

        pub fn with_videos(count: usize) -> FakeElement {
            FakeElement {
                videos: vec![FakeVideo::default(); count],
                ..FakeElement::default()
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct FakeControl {
        pub key: String,
        pub placement: Placement,
        pub view: ControlView,
    }

    /// In-memory document keyed by selector
    #[derive(Default)]
    pub struct FakePage {
        elements: RefCell<BTreeMap<&'static str, Vec<FakeElement>>>,
        controls: RefCell<Vec<FakeControl>>,
        attributes: RefCell<BTreeMap<String, (String, String)>>,
        clicks: RefCell<Vec<String>>,
        forced: RefCell<Vec<Anchor>>,
        mutations: Cell<usize>,
    }

    impl FakePage {
        pub fn new() -> FakePage {
            FakePage::default()
        }

        pub fn with(self, selector: &'static str, count: usize) -> FakePage {
            for _ in 0..count {
                self.add(selector, FakeElement::default());
            }
            self
        }

        pub fn with_element(self, selector: &'static str, element: FakeElement) -> FakePage {
            self.add(selector, element);
            self
        }

        pub fn with_attribute(self, selector: &str, attribute: &str, value: &str) -> FakePage {
            self.attributes
                .borrow_mut()
                .insert(selector.to_string(), (attribute.to_string(), value.to_string()));
            self
        }

        pub fn add(&self, selector: &'static str, element: FakeElement) {
            self.elements.borrow_mut().entry(selector).or_default().push(element);
        }

        pub fn elements(&self, selector: &'static str) -> Vec<FakeElement> {
            self.elements.borrow().get(selector).cloned().unwrap_or_default()
        }

        pub fn hidden_elements(&self) -> usize {
            self.elements
                .borrow()
                .values()
                .flatten()
                .filter(|element| element.is_hidden())
                .count()
        }

        pub fn controls(&self) -> Vec<FakeControl> {
            self.controls.borrow().clone()
        }

        pub fn controls_for(&self, key: &str) -> usize {
            self.controls.borrow().iter().filter(|control| control.key == key).count()
        }

        pub fn control(&self, key: &str) -> Option<ControlView> {
            self.controls
                .borrow()
                .iter()
                .find(|control| control.key == key)
                .map(|control| control.view.clone())
        }

        pub fn attribute(&self, selector: &str) -> Option<String> {
            self.attributes.borrow().get(selector).map(|(_, value)| value.clone())
        }

        pub fn clicks(&self) -> Vec<String> {
            self.clicks.borrow().clone()
        }

        pub fn forced(&self) -> Vec<Anchor> {
            self.forced.borrow().clone()
        }

        pub fn mutations(&self) -> usize {
            self.mutations.get()
        }

        /// Document content and controls, for comparing states
        pub fn snapshot(&self) -> (BTreeMap<&'static str, Vec<FakeElement>>, Vec<FakeControl>) {
            (self.elements.borrow().clone(), self.controls.borrow().clone())
        }

        fn selected(&self, target: &Target) -> Vec<usize> {
            let elements = self.elements.borrow();
            let Some(candidates) = elements.get(target.selector) else {
                return Vec::new();
            };
            let selected = candidates
                .iter()
                .enumerate()
                .filter(|(_, element)| {
                    target
                        .contains
                        .map_or(true, |inner| element.descendants.contains(&inner))
                })
                .filter(|(_, element)| {
                    !target
                        .exclude_within
                        .iter()
                        .any(|outer| element.ancestors.contains(outer))
                })
                .map(|(index, _)| index);
            if target.first_only {
                selected.take(1).collect()
            } else {
                selected.collect()
            }
        }

        fn bump(&self) {
            self.mutations.set(self.mutations.get() + 1);
        }
    }

    impl Page for FakePage {
        fn count(&self, target: &Target) -> usize {
            self.selected(target).len()
        }

        fn present(&self, target: &Target, strategy: HideStrategy, hidden: bool) -> usize {
            let indices = self.selected(target);
            let mut elements = self.elements.borrow_mut();
            let Some(candidates) = elements.get_mut(target.selector) else {
                return 0;
            };
            let mut changed = 0;
            for index in indices {
                let element = &mut candidates[index];
                let before = element.clone();
                if hidden {
                    match strategy {
                        HideStrategy::CssClass => element.hidden_class = true,
                        HideStrategy::InlineDisplayNone => element.display_none = true,
                    }
                } else {
                    element.hidden_class = false;
                    element.display_none = false;
                }
                if *element != before {
                    changed += 1;
                }
            }
            for _ in 0..changed {
                self.bump();
            }
            changed
        }

        fn silence_media(&self, target: &Target, silenced: bool) {
            let indices = self.selected(target);
            let mut elements = self.elements.borrow_mut();
            if let Some(candidates) = elements.get_mut(target.selector) {
                for index in indices {
                    for video in &mut candidates[index].videos {
                        if silenced {
                            video.paused = true;
                            video.muted = true;
                        } else {
                            video.muted = false;
                        }
                    }
                }
            }
        }

        fn force_visible(&self, anchor: &Anchor) {
            self.forced.borrow_mut().push(*anchor);
        }

        fn click_if_attribute(&self, selector: &str, attribute: &str, value: &str) -> bool {
            let mut attributes = self.attributes.borrow_mut();
            match attributes.get_mut(selector) {
                Some((name, current)) if name == attribute && current == value => {
                    *current = "false".to_string();
                    self.clicks.borrow_mut().push(selector.to_string());
                    self.bump();
                    true
                }
                _ => false,
            }
        }

        fn has_control(&self, key: &str) -> bool {
            self.controls_for(key) > 0
        }

        fn insert_control(&self, key: &str, placement: &Placement, _near: &Target, view: &ControlView) -> bool {
            self.controls.borrow_mut().push(FakeControl {
                key: key.to_string(),
                placement: *placement,
                view: view.clone(),
            });
            self.bump();
            true
        }

        fn update_control(&self, key: &str, view: &ControlView) {
            let mut controls = self.controls.borrow_mut();
            let mut changed = false;
            for control in controls.iter_mut().filter(|control| control.key == key) {
                if control.view != *view {
                    control.view = view.clone();
                    changed = true;
                }
            }
            if changed {
                self.bump();
            }
        }

        fn remove_controls(&self) -> usize {
            let removed = self.controls.borrow_mut().drain(..).count();
            if removed > 0 {
                self.bump();
            }
            removed
        }
    }
}
