/// Visibility controller: the per-page hide/reveal state machine
///
/// All triggers (mutations, timers, messages, preference changes) end up in
/// [`VisibilityController::reconcile`], which only reads the current document
/// and re-applies presentation. Repeating it is always safe.
use crate::config::REVEAL_SECONDS;
use crate::countdown::{Countdown, CountdownStatus};
use crate::page::Page;
use crate::prefs::{PreferenceChange, StoredPreferences, Theme};
use crate::registry::{self, ContentGroup, GroupScope, SiteDescriptor};
use crate::site::{PageLocation, SiteId};
use crate::toggle::{Control, ControlView, Palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Unsupported site, or the site is switched off in preferences
    Disabled,
    Hidden,
    /// Shown after an explicit confirmation; the countdown is running
    Revealed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityState {
    pub hidden: bool,
    pub enabled: bool,
    pub strict: bool,
    pub countdown: Countdown,
    pub theme: Option<Theme>,
}

impl VisibilityState {
    fn new(enabled: bool) -> Self {
        VisibilityState {
            hidden: true,
            enabled,
            strict: false,
            countdown: Countdown::new(REVEAL_SECONDS),
            theme: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.enabled {
            Phase::Disabled
        } else if self.hidden {
            Phase::Hidden
        } else {
            Phase::Revealed
        }
    }
}

/// What a reconciliation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub groups_matched: usize,
    pub elements_changed: usize,
    pub controls_created: usize,
    pub controls_removed: usize,
}

/// Result of clicking a toggle control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Content was revealed and is hidden again
    Hidden,
    /// Content is hidden; the caller must ask the user before revealing
    NeedsConfirmation,
    /// Nothing to toggle (disabled site or strict mode)
    Ignored,
}

pub struct VisibilityController<P: Page> {
    page: P,
    site: Option<&'static dyn SiteDescriptor>,
    location: PageLocation,
    state: VisibilityState,
    prefers_dark: bool,
}

impl<P: Page> VisibilityController<P> {
    pub fn new(page: P, location: PageLocation) -> Self {
        let site = location.site().map(registry::descriptor);
        VisibilityController {
            page,
            site,
            location,
            state: VisibilityState::new(site.is_some()),
            prefers_dark: false,
        }
    }

    /// Colour scheme used for controls while no theme is stored
    pub fn with_system_dark(mut self, prefers_dark: bool) -> Self {
        self.prefers_dark = prefers_dark;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn state(&self) -> &VisibilityState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn site(&self) -> Option<SiteId> {
        self.site.map(|site| site.id())
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(Theme::resolve(self.state.theme, self.prefers_dark))
    }

    fn control_view(&self) -> ControlView {
        ControlView::new(self.state.hidden, self.state.countdown.remaining(), self.palette())
    }

    /// The site's descriptor while hiding is in effect
    fn active_site(&self) -> Option<&'static dyn SiteDescriptor> {
        self.site.filter(|_| self.state.enabled)
    }

    fn page_allowed(&self, site: &dyn SiteDescriptor) -> bool {
        site.page_allowed(&self.location)
    }

    fn applies(group: &ContentGroup, allowed: bool) -> bool {
        !(allowed && group.scope == GroupScope::Feed)
    }

    /// Re-apply the current state to whatever the document contains right now
    pub fn reconcile(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let Some(site) = self.active_site() else {
            return report;
        };

        let allowed = self.page_allowed(site);
        let hidden = self.state.hidden;
        let view = self.control_view();

        for group in site.groups() {
            if !Self::applies(group, allowed) || self.page.count(&group.target) == 0 {
                continue;
            }
            report.groups_matched += 1;
            report.elements_changed += self.page.present(&group.target, group.strategy, hidden);
            // Unmuting only happens on explicit transitions so a user's own mute sticks
            if group.silence_media && hidden {
                self.page.silence_media(&group.target, true);
            }
            if let (Some(control), false) = (&group.control, self.state.strict) {
                if self.ensure_control(control, group, &view) {
                    report.controls_created += 1;
                }
            }
        }

        for anchor in site.keep_visible() {
            self.page.force_visible(anchor);
        }
        if self.state.strict {
            report.controls_removed = self.page.remove_controls();
        }
        if hidden && !allowed {
            site.on_hide(&self.page);
        }

        if report.elements_changed > 0 || report.controls_created > 0 {
            log::debug!(
                "Reconciled {}: {} groups, {} elements changed, {} controls created",
                site.id().key(),
                report.groups_matched,
                report.elements_changed,
                report.controls_created
            );
        }
        report
    }

    /// Presence check before creation keeps one control per key
    fn ensure_control(&self, control: &Control, group: &ContentGroup, view: &ControlView) -> bool {
        if self.page.has_control(control.key) {
            self.page.update_control(control.key, view);
            false
        } else {
            self.page.insert_control(control.key, &control.placement, &group.target, view)
        }
    }

    /// Apply hide/show to exactly the elements of one group
    pub fn set_hidden(&self, group_name: &str, hidden: bool) -> usize {
        let Some(site) = self.active_site() else {
            return 0;
        };
        let Some(group) = site.group(group_name) else {
            log::warn!("Unknown content group {} for {}", group_name, site.id().key());
            return 0;
        };
        if !Self::applies(group, self.page_allowed(site)) {
            return 0;
        }

        let changed = self.page.present(&group.target, group.strategy, hidden);
        if group.silence_media {
            self.page.silence_media(&group.target, hidden);
        }
        if let Some(key) = group.control_key() {
            if self.page.has_control(key) {
                self.page.update_control(key, &self.control_view());
            }
        }
        changed
    }

    /// Show every group and drop every control
    pub fn reveal_all(&mut self) -> usize {
        self.state.countdown.stop();
        let mut changed = 0;
        if let Some(site) = self.site {
            for group in site.groups() {
                changed += self.page.present(&group.target, group.strategy, false);
                if group.silence_media {
                    self.page.silence_media(&group.target, false);
                }
            }
        }
        self.page.remove_controls();
        changed
    }

    fn set_control_groups_hidden(&self, key: &str, hidden: bool) {
        if let Some(site) = self.site {
            for group in site.groups_for_control(key) {
                self.set_hidden(group.name, hidden);
            }
        }
    }

    /// A click on the control tagged `key`
    pub fn request_toggle(&mut self, key: &str) -> ToggleOutcome {
        if self.state.strict {
            return ToggleOutcome::Ignored;
        }
        match self.phase() {
            Phase::Disabled => ToggleOutcome::Ignored,
            Phase::Hidden => ToggleOutcome::NeedsConfirmation,
            Phase::Revealed => {
                self.state.hidden = true;
                self.state.countdown.stop();
                self.set_control_groups_hidden(key, true);
                self.reconcile();
                ToggleOutcome::Hidden
            }
        }
    }

    /// Answer to the confirmation prompt; returns whether content was revealed
    pub fn confirm_reveal(&mut self, key: &str, confirmed: bool) -> bool {
        if !confirmed {
            log::debug!("Reveal cancelled");
            return false;
        }
        // State may have moved while the prompt was open
        if self.phase() != Phase::Hidden || self.state.strict {
            return false;
        }

        self.state.hidden = false;
        self.state.countdown.start();
        self.set_control_groups_hidden(key, false);
        self.reconcile();
        log::info!("Content revealed for {} seconds", self.state.countdown.remaining());
        true
    }

    /// Advance the reveal countdown by one second
    pub fn tick(&mut self) -> CountdownStatus {
        if self.phase() != Phase::Revealed {
            return CountdownStatus::Idle;
        }
        let status = self.state.countdown.tick();
        match status {
            CountdownStatus::Expired => {
                log::info!("Reveal time is up, hiding content again");
                self.state.hidden = true;
                self.reconcile();
            }
            CountdownStatus::Running(_) => self.refresh_controls(),
            CountdownStatus::Idle => {}
        }
        status
    }

    fn refresh_controls(&self) {
        let Some(site) = self.active_site() else {
            return;
        };
        let view = self.control_view();
        for group in site.groups() {
            if let Some(key) = group.control_key() {
                if self.page.has_control(key) {
                    self.page.update_control(key, &view);
                }
            }
        }
    }

    /// Initial preference load
    pub fn apply_preferences(&mut self, prefs: &StoredPreferences) {
        self.state.strict = prefs.strict();
        self.state.theme = prefs.theme();
        let enabled = self.site.is_some_and(|site| prefs.site_enabled(site.id()));
        self.set_enabled(enabled);
    }

    pub fn on_preference_change(&mut self, change: PreferenceChange) {
        match change {
            PreferenceChange::Site(site, enabled) => {
                if self.site() == Some(site) {
                    self.set_enabled(enabled);
                }
            }
            PreferenceChange::Strict(strict) => self.set_strict(strict),
            PreferenceChange::Theme(theme) => {
                self.state.theme = theme;
                self.refresh_controls();
            }
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.site.is_none() {
            self.state.enabled = false;
            return;
        }
        match (self.state.enabled, enabled) {
            (_, false) => {
                log::info!("Site disabled, showing all content");
                self.state.enabled = false;
                self.state.hidden = true;
                self.reveal_all();
            }
            (false, true) => {
                log::info!("Site enabled, hiding content");
                self.state.enabled = true;
                self.state.hidden = true;
                self.reconcile();
            }
            (true, true) => {
                self.reconcile();
            }
        }
    }

    fn set_strict(&mut self, strict: bool) {
        self.state.strict = strict;
        if strict {
            if self.phase() == Phase::Revealed {
                self.state.hidden = true;
                self.state.countdown.stop();
            }
            self.page.remove_controls();
        }
        self.reconcile();
    }

    /// Reconcile after a client-side navigation may have changed the path
    pub fn navigate(&mut self, location: PageLocation) -> ReconcileReport {
        self.relocate(location);
        self.reconcile()
    }

    /// Apply a batch of storage changes at the page's current location
    pub fn apply_changes(
        &mut self,
        changes: Vec<PreferenceChange>,
        location: Option<PageLocation>,
    ) -> ReconcileReport {
        if let Some(location) = location {
            self.relocate(location);
        }
        for change in changes {
            log::debug!("Preference changed: {:?}", change);
            self.on_preference_change(change);
        }
        self.reconcile()
    }

    fn relocate(&mut self, location: PageLocation) {
        if location != self.location {
            log::debug!("Navigated to {}", location.path);
            self.location = location;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::{FakeElement, FakePage};
    use crate::registry::YOUTUBE_AUTOPLAY;
    use crate::toggle::{HIDE_LABEL, SHOW_LABEL};
    use serde_json::json;

    const YT_FEED: &str = "div#contents.style-scope.ytd-rich-grid-renderer";
    const YT_RELATED: &str = "#related";
    const YT_SHORTS: &str = "#page-manager > ytd-shorts";
    const TW_FEED: &str = "[data-testid=\"primaryColumn\"] [data-testid=\"cellInnerDiv\"]";
    const TIKTOK_FEED: &str = "#main-content-homepage_hot";

    fn controller(page: FakePage, host: &str, path: &str) -> VisibilityController<FakePage> {
        VisibilityController::new(page, PageLocation::new(host, path))
    }

    fn youtube_home() -> VisibilityController<FakePage> {
        let page = FakePage::new().with(YT_FEED, 3).with(YT_RELATED, 1);
        let mut controller = controller(page, "www.youtube.com", "/");
        controller.apply_preferences(&StoredPreferences::default());
        controller
    }

    fn reveal(controller: &mut VisibilityController<FakePage>, key: &str) {
        assert_eq!(controller.request_toggle(key), ToggleOutcome::NeedsConfirmation);
        assert!(controller.confirm_reveal(key, true));
    }

    #[test]
    fn test_initial_pass_hides_and_creates_controls() {
        let controller = youtube_home();

        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(controller.page().elements(YT_FEED).iter().all(|e| e.hidden_class));
        assert!(controller.page().elements(YT_RELATED).iter().all(|e| e.display_none));
        assert_eq!(controller.page().controls_for("main-feed"), 1);
        assert_eq!(controller.page().controls_for("sidebar-content"), 1);
        assert_eq!(controller.page().control("main-feed").unwrap().label, SHOW_LABEL);
    }

    #[test]
    fn test_missing_groups_are_skipped() {
        let controller = youtube_home();

        assert_eq!(controller.page().controls_for("end-screen"), 0);
        assert_eq!(controller.page().controls_for("shorts-feed"), 0);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let controller = youtube_home();
        let after_first = controller.page().snapshot();
        let mutations = controller.page().mutations();

        for _ in 0..5 {
            let report = controller.reconcile();
            assert_eq!(report.elements_changed, 0);
            assert_eq!(report.controls_created, 0);
        }

        assert_eq!(controller.page().snapshot(), after_first);
        assert_eq!(controller.page().mutations(), mutations);
    }

    #[test]
    fn test_reconcile_catches_late_content() {
        let controller = youtube_home();
        controller.page().add(YT_FEED, FakeElement::default());

        let report = controller.reconcile();

        assert_eq!(report.elements_changed, 1);
        assert_eq!(report.controls_created, 0);
        assert_eq!(controller.page().controls_for("main-feed"), 1);
        assert!(controller.page().elements(YT_FEED).iter().all(|e| e.hidden_class));
    }

    #[test]
    fn test_unsupported_site_is_disabled() {
        let page = FakePage::new().with(YT_FEED, 2);
        let mut controller = controller(page, "example.com", "/");
        controller.apply_preferences(&StoredPreferences::default());

        assert_eq!(controller.phase(), Phase::Disabled);
        assert_eq!(controller.site(), None);
        assert_eq!(controller.reconcile(), ReconcileReport::default());
        assert_eq!(controller.page().hidden_elements(), 0);
        assert!(controller.page().controls().is_empty());
    }

    #[test]
    fn test_disabled_site_never_hides() {
        let page = FakePage::new().with(YT_FEED, 3).with(YT_SHORTS, 1);
        let mut controller = controller(page, "youtube.com", "/");
        controller.apply_preferences(&StoredPreferences::from_value(&json!({ "youtube": false })));

        for _ in 0..3 {
            controller.reconcile();
        }

        assert_eq!(controller.phase(), Phase::Disabled);
        assert_eq!(controller.page().hidden_elements(), 0);
        assert!(controller.page().controls().is_empty());
        assert_eq!(controller.request_toggle("main-feed"), ToggleOutcome::Ignored);
    }

    #[test]
    fn test_strict_mode_hides_without_controls() {
        let page = FakePage::new().with(YT_FEED, 2).with(YT_RELATED, 1);
        let mut controller = controller(page, "youtube.com", "/");
        controller.apply_preferences(&StoredPreferences::from_value(&json!({ "strict": true })));
        controller.reconcile();

        assert_eq!(controller.page().hidden_elements(), 3);
        assert!(controller.page().controls().is_empty());
        assert_eq!(controller.request_toggle("main-feed"), ToggleOutcome::Ignored);
    }

    #[test]
    fn test_strict_mode_turned_on_removes_controls_and_rehides() {
        let mut controller = youtube_home();
        reveal(&mut controller, "main-feed");

        controller.on_preference_change(PreferenceChange::Strict(true));

        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(!controller.state().countdown.is_running());
        assert!(controller.page().controls().is_empty());
        assert_eq!(controller.page().hidden_elements(), 4);
    }

    #[test]
    fn test_strict_mode_turned_off_restores_controls() {
        let mut controller = youtube_home();
        controller.on_preference_change(PreferenceChange::Strict(true));
        assert!(controller.page().controls().is_empty());

        controller.on_preference_change(PreferenceChange::Strict(false));

        assert_eq!(controller.page().controls_for("main-feed"), 1);
        assert_eq!(controller.page().controls_for("sidebar-content"), 1);
    }

    #[test]
    fn test_confirmed_reveal_then_countdown_rehides() {
        let mut controller = youtube_home();

        reveal(&mut controller, "main-feed");

        assert_eq!(controller.phase(), Phase::Revealed);
        assert!(controller.state().countdown.is_running());
        assert!(controller.page().elements(YT_FEED).iter().all(|e| !e.is_hidden()));
        assert!(controller.page().elements(YT_RELATED).iter().all(|e| !e.is_hidden()));
        let view = controller.page().control("main-feed").unwrap();
        assert_eq!(view.label, HIDE_LABEL);
        assert!(view.countdown_visible);
        assert_eq!(view.countdown, "10:00");

        for _ in 0..REVEAL_SECONDS - 1 {
            assert!(matches!(controller.tick(), CountdownStatus::Running(_)));
        }
        assert_eq!(controller.page().control("main-feed").unwrap().countdown, "0:01");
        assert_eq!(controller.tick(), CountdownStatus::Expired);

        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(controller.page().elements(YT_FEED).iter().all(|e| e.hidden_class));
        assert_eq!(controller.page().control("main-feed").unwrap().label, SHOW_LABEL);
        assert_eq!(controller.tick(), CountdownStatus::Idle);
    }

    #[test]
    fn test_cancelled_reveal_changes_nothing() {
        let mut controller = youtube_home();
        let before = controller.page().snapshot();

        assert_eq!(controller.request_toggle("main-feed"), ToggleOutcome::NeedsConfirmation);
        assert!(!controller.confirm_reveal("main-feed", false));

        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(!controller.state().countdown.is_running());
        assert_eq!(controller.tick(), CountdownStatus::Idle);
        assert_eq!(controller.page().snapshot(), before);
    }

    #[test]
    fn test_hide_needs_no_confirmation() {
        let mut controller = youtube_home();
        reveal(&mut controller, "main-feed");
        controller.tick();

        assert_eq!(controller.request_toggle("main-feed"), ToggleOutcome::Hidden);

        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(!controller.state().countdown.is_running());
        assert_eq!(controller.state().countdown.remaining(), REVEAL_SECONDS);
        assert_eq!(controller.page().hidden_elements(), 4);
    }

    #[test]
    fn test_confirmation_ignored_if_site_disabled_meanwhile() {
        let mut controller = youtube_home();
        assert_eq!(controller.request_toggle("main-feed"), ToggleOutcome::NeedsConfirmation);

        controller.on_preference_change(PreferenceChange::Site(SiteId::YouTube, false));

        assert!(!controller.confirm_reveal("main-feed", true));
        assert_eq!(controller.phase(), Phase::Disabled);
    }

    #[test]
    fn test_disable_while_hidden_reveals_everything_in_one_pass() {
        let mut controller = youtube_home();
        assert_eq!(controller.page().hidden_elements(), 4);

        controller.on_preference_change(PreferenceChange::Site(SiteId::YouTube, false));

        assert_eq!(controller.phase(), Phase::Disabled);
        assert_eq!(controller.page().hidden_elements(), 0);
        assert!(controller.page().controls().is_empty());

        controller.reconcile();
        assert_eq!(controller.page().hidden_elements(), 0);
    }

    #[test]
    fn test_disable_while_revealed_stops_countdown() {
        let mut controller = youtube_home();
        reveal(&mut controller, "main-feed");

        controller.on_preference_change(PreferenceChange::Site(SiteId::YouTube, false));

        assert_eq!(controller.phase(), Phase::Disabled);
        assert!(!controller.state().countdown.is_running());
        assert_eq!(controller.tick(), CountdownStatus::Idle);
    }

    #[test]
    fn test_enable_notification_hides_again() {
        let page = FakePage::new().with(YT_FEED, 2);
        let mut controller = controller(page, "youtube.com", "/");
        controller.apply_preferences(&StoredPreferences::from_value(&json!({ "youtube": false })));
        assert_eq!(controller.page().hidden_elements(), 0);

        controller.on_preference_change(PreferenceChange::Site(SiteId::YouTube, true));

        assert_eq!(controller.phase(), Phase::Hidden);
        assert_eq!(controller.page().hidden_elements(), 2);
        assert_eq!(controller.page().controls_for("main-feed"), 1);
    }

    #[test]
    fn test_changes_for_other_sites_are_ignored() {
        let mut controller = youtube_home();

        controller.on_preference_change(PreferenceChange::Site(SiteId::TikTok, false));

        assert_eq!(controller.phase(), Phase::Hidden);
        assert_eq!(controller.page().hidden_elements(), 4);
    }

    #[test]
    fn test_allowed_page_is_left_untouched() {
        let page = FakePage::new().with(YT_FEED, 2);
        let mut controller = controller(page, "youtube.com", "/feed/subscriptions");
        controller.apply_preferences(&StoredPreferences::default());

        assert_eq!(controller.page().hidden_elements(), 0);
        assert!(controller.page().controls().is_empty());
        assert_eq!(controller.set_hidden("main-feed", true), 0);
    }

    #[test]
    fn test_youtube_shorts_hidden_and_silenced_on_shorts_page() {
        let page = FakePage::new()
            .with_element(YT_SHORTS, FakeElement::with_videos(2))
            .with_attribute(YOUTUBE_AUTOPLAY, "aria-checked", "true");
        let mut controller = controller(page, "www.youtube.com", "/shorts/abc123");
        controller.apply_preferences(&StoredPreferences::default());

        let shorts = controller.page().elements(YT_SHORTS);
        assert!(shorts[0].display_none);
        assert!(shorts[0].videos.iter().all(|v| v.paused && v.muted));
        assert_eq!(controller.page().controls_for("shorts-feed"), 1);
        assert_eq!(controller.page().clicks(), vec![YOUTUBE_AUTOPLAY.to_string()]);
        assert_eq!(controller.page().attribute(YOUTUBE_AUTOPLAY).as_deref(), Some("false"));
    }

    #[test]
    fn test_youtube_shorts_hidden_even_on_allowed_page() {
        let page = FakePage::new()
            .with(YT_FEED, 1)
            .with_element(YT_SHORTS, FakeElement::with_videos(1));
        let mut controller = controller(page, "youtube.com", "/@someone/videos");
        controller.apply_preferences(&StoredPreferences::default());

        assert!(!controller.page().elements(YT_FEED)[0].is_hidden());
        let shorts = controller.page().elements(YT_SHORTS);
        assert!(shorts[0].display_none);
        assert!(shorts[0].videos[0].muted);
    }

    #[test]
    fn test_revealing_shorts_unmutes() {
        let page = FakePage::new().with_element(YT_SHORTS, FakeElement::with_videos(1));
        let mut controller = controller(page, "youtube.com", "/shorts/abc");
        controller.apply_preferences(&StoredPreferences::default());

        reveal(&mut controller, "shorts-feed");

        let shorts = controller.page().elements(YT_SHORTS);
        assert!(!shorts[0].display_none);
        assert!(!shorts[0].videos[0].muted);
    }

    #[test]
    fn test_twitter_shares_one_control_and_keeps_compose_visible() {
        let page = FakePage::new()
            .with(TW_FEED, 4)
            .with(
                "[data-testid=\"sidebarColumn\"] > div > div:not(:first-child)",
                2,
            );
        let mut controller = controller(page, "x.com", "/home");
        controller.apply_preferences(&StoredPreferences::default());
        controller.reconcile();

        assert_eq!(controller.page().hidden_elements(), 6);
        assert_eq!(controller.page().controls().len(), 1);
        assert_eq!(controller.page().controls_for("twitter"), 1);
        assert_eq!(controller.page().forced().len(), 4);
    }

    #[test]
    fn test_twitter_skips_cells_inside_compose_box() {
        let inside_compose = FakeElement {
            ancestors: vec!["[data-testid=\"tweetTextarea_0\"]"],
            ..FakeElement::default()
        };
        let page = FakePage::new().with(TW_FEED, 1).with_element(TW_FEED, inside_compose);
        let mut controller = controller(page, "twitter.com", "/home");
        controller.apply_preferences(&StoredPreferences::default());

        let cells = controller.page().elements(TW_FEED);
        assert!(cells[0].display_none);
        assert!(!cells[1].display_none);
    }

    #[test]
    fn test_navigation_to_allowed_page_stops_hiding_new_content() {
        let page = FakePage::new().with(TW_FEED, 1);
        let mut controller = controller(page, "x.com", "/home");
        controller.apply_preferences(&StoredPreferences::default());
        assert_eq!(controller.page().hidden_elements(), 1);

        controller.navigate(PageLocation::new("x.com", "/someone/status/42"));
        controller.page().add(TW_FEED, FakeElement::default());
        let report = controller.reconcile();

        assert_eq!(report, ReconcileReport::default());
        assert_eq!(controller.page().hidden_elements(), 1);
    }

    #[test]
    fn test_preference_change_uses_the_current_path() {
        let page = FakePage::new().with(TW_FEED, 2);
        let mut controller = controller(page, "x.com", "/home");
        controller.apply_preferences(&StoredPreferences::from_value(&json!({ "twitter": false })));
        assert_eq!(controller.page().hidden_elements(), 0);

        let report = controller.apply_changes(
            vec![PreferenceChange::Site(SiteId::Twitter, true)],
            Some(PageLocation::new("x.com", "/someone/status/42")),
        );

        assert_eq!(report, ReconcileReport::default());
        assert_eq!(controller.location().path, "/someone/status/42");
        assert_eq!(controller.page().hidden_elements(), 0);

        controller.apply_changes(
            vec![PreferenceChange::Strict(false)],
            Some(PageLocation::new("x.com", "/home")),
        );
        assert_eq!(controller.page().hidden_elements(), 2);
    }

    #[test]
    fn test_facebook_hides_only_first_feed_container() {
        let selector = "div[role=\"main\"] div > div > div > div > div > div > div > div";
        let with_articles = FakeElement {
            descendants: vec!["[role=\"article\"]"],
            ..FakeElement::default()
        };
        let page = FakePage::new()
            .with(selector, 1)
            .with_element(selector, with_articles.clone())
            .with_element(selector, with_articles);
        let mut controller = controller(page, "www.facebook.com", "/");
        controller.apply_preferences(&StoredPreferences::default());

        let containers = controller.page().elements(selector);
        assert!(!containers[0].hidden_class);
        assert!(containers[1].hidden_class);
        assert!(!containers[2].hidden_class);
    }

    #[test]
    fn test_tiktok_pauses_all_videos_while_hidden() {
        let page = FakePage::new()
            .with(TIKTOK_FEED, 1)
            .with_element("video", FakeElement::with_videos(1));
        let mut controller = controller(page, "www.tiktok.com", "/");
        controller.apply_preferences(&StoredPreferences::default());

        assert!(controller.page().elements(TIKTOK_FEED)[0].display_none);
        assert_eq!(controller.page().controls_for("tiktok"), 1);
        let videos = controller.page().elements("video");
        assert!(videos[0].videos[0].paused && videos[0].videos[0].muted);
    }

    #[test]
    fn test_theme_change_restyles_controls() {
        let mut controller = youtube_home();

        controller.on_preference_change(PreferenceChange::Theme(Some(Theme::Dark)));

        assert_eq!(controller.page().control("main-feed").unwrap().palette, Palette::DARK);
    }

    #[test]
    fn test_system_dark_scheme_used_without_stored_theme() {
        let page = FakePage::new().with(YT_FEED, 1);
        let mut controller = controller(page, "youtube.com", "/").with_system_dark(true);
        controller.apply_preferences(&StoredPreferences::default());

        assert_eq!(controller.palette(), Palette::DARK);
        assert_eq!(controller.page().control("main-feed").unwrap().palette, Palette::DARK);
    }
}
