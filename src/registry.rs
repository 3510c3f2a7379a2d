/// Per-site rules: which regions to hide, how, and where hiding must not happen
use crate::page::{Anchor, HideStrategy, Page, Target};
use crate::site::{PageLocation, SiteId};
use crate::toggle::{Control, Placement};
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupScope {
    /// Left alone on allowed pages
    Feed,
    /// Hidden even on allowed pages
    Always,
}

/// A named region of a page subject to hide/show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentGroup {
    pub name: &'static str,
    pub target: Target,
    pub strategy: HideStrategy,
    pub scope: GroupScope,
    /// Pause and mute media inside the group while it is hidden
    pub silence_media: bool,
    pub control: Option<Control>,
}

impl ContentGroup {
    /// A feed group hidden by class, with its own control placed before it
    pub const fn new(name: &'static str, target: Target) -> ContentGroup {
        ContentGroup {
            name,
            target,
            strategy: HideStrategy::CssClass,
            scope: GroupScope::Feed,
            silence_media: false,
            control: Some(Control::new(name, Placement::BeforeFirstMatch)),
        }
    }

    pub const fn inline(self) -> ContentGroup {
        ContentGroup { strategy: HideStrategy::InlineDisplayNone, ..self }
    }

    pub const fn always(self) -> ContentGroup {
        ContentGroup { scope: GroupScope::Always, ..self }
    }

    pub const fn silencing_media(self) -> ContentGroup {
        ContentGroup { silence_media: true, ..self }
    }

    pub const fn control(self, key: &'static str, placement: Placement) -> ContentGroup {
        ContentGroup { control: Some(Control::new(key, placement)), ..self }
    }

    pub const fn without_control(self) -> ContentGroup {
        ContentGroup { control: None, ..self }
    }

    pub fn control_key(&self) -> Option<&'static str> {
        self.control.map(|control| control.key)
    }
}

/// The rules for one supported site
pub trait SiteDescriptor: Sync {
    fn id(&self) -> SiteId;

    fn groups(&self) -> &'static [ContentGroup];

    /// Pages where feed groups must be left alone even though the site is enabled
    fn page_allowed(&self, _location: &PageLocation) -> bool {
        false
    }

    /// Containers forced visible after every pass (compose boxes, search)
    fn keep_visible(&self) -> &'static [Anchor] {
        &[]
    }

    /// Extra work done on every pass while content is hidden
    fn on_hide(&self, _page: &dyn Page) {}

    fn group(&self, name: &str) -> Option<&'static ContentGroup> {
        self.groups().iter().find(|group| group.name == name)
    }

    fn groups_for_control(&self, key: &str) -> Vec<&'static ContentGroup> {
        self.groups()
            .iter()
            .filter(|group| group.control_key() == Some(key))
            .collect()
    }
}

pub fn descriptor(site: SiteId) -> &'static dyn SiteDescriptor {
    match site {
        SiteId::YouTube => &YouTube,
        SiteId::Facebook => &Facebook,
        SiteId::Instagram => &Instagram,
        SiteId::Twitter => &Twitter,
        SiteId::TikTok => &TikTok,
        SiteId::Pinterest => &Pinterest,
    }
}

pub struct YouTube;

pub const YOUTUBE_SHORTS: &str = "#page-manager > ytd-shorts";
pub const YOUTUBE_AUTOPLAY: &str = ".ytp-autonav-toggle-button";

static YOUTUBE_GROUPS: [ContentGroup; 5] = [
    ContentGroup::new("main-feed", Target::new("div#contents.style-scope.ytd-rich-grid-renderer")),
    ContentGroup::new("end-screen", Target::new(".ytp-endscreen-content, .ytp-ce-element")),
    ContentGroup::new("sidebar-content", Target::new("#related")).inline(),
    ContentGroup::new("shorts-feed", Target::new(YOUTUBE_SHORTS))
        .inline()
        .always()
        .silencing_media()
        .control("shorts-feed", Placement::Floating),
    ContentGroup::new("shorts-shelf", Target::new("ytd-reel-shelf-renderer"))
        .inline()
        .always()
        .without_control(),
];

impl SiteDescriptor for YouTube {
    fn id(&self) -> SiteId {
        SiteId::YouTube
    }

    fn groups(&self) -> &'static [ContentGroup] {
        &YOUTUBE_GROUPS
    }

    // Channel uploads and the subscriptions feed are chosen by the user
    fn page_allowed(&self, location: &PageLocation) -> bool {
        location.path.contains("/videos") || location.path.starts_with("/feed/subscriptions")
    }

    fn on_hide(&self, page: &dyn Page) {
        if page.click_if_attribute(YOUTUBE_AUTOPLAY, "aria-checked", "true") {
            log::debug!("Disabled YouTube autoplay");
        }
    }
}

pub struct Twitter;

const TWEET_BOX: &str = "[data-testid=\"tweetTextarea_0\"]";
const SEARCH_BOX: &str = "[data-testid=\"SearchBox_Search_Input\"]";

const COMPOSE_CONTAINER: Anchor = Anchor {
    selector: TWEET_BOX,
    closest: "[data-testid=\"primaryColumn\"] > div > div",
};

const SEARCH_CONTAINER: Anchor = Anchor {
    selector: SEARCH_BOX,
    closest: "[role=\"search\"]",
};

static TWITTER_GROUPS: [ContentGroup; 2] = [
    ContentGroup::new(
        "main-feed",
        Target::new("[data-testid=\"primaryColumn\"] [data-testid=\"cellInnerDiv\"]")
            .excluding(&[TWEET_BOX, SEARCH_BOX]),
    )
    .inline()
    .control("twitter", Placement::After(COMPOSE_CONTAINER)),
    ContentGroup::new(
        "sidebar-content",
        Target::new("[data-testid=\"sidebarColumn\"] > div > div:not(:first-child)")
            .excluding(&[TWEET_BOX, SEARCH_BOX]),
    )
    .inline()
    .control("twitter", Placement::After(COMPOSE_CONTAINER)),
];

static TWITTER_KEEP_VISIBLE: [Anchor; 2] = [COMPOSE_CONTAINER, SEARCH_CONTAINER];

/// First path segments that belong to the app rather than to a user handle
const TWITTER_RESERVED_PATHS: [&str; 8] = [
    "home",
    "explore",
    "notifications",
    "messages",
    "search",
    "settings",
    "compose",
    "i",
];

static TWITTER_PROFILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([A-Za-z0-9_]{1,15})/?$").expect("valid profile pattern"));

impl Twitter {
    fn is_profile_page(path: &str) -> bool {
        TWITTER_PROFILE
            .captures(path)
            .and_then(|captures| captures.get(1))
            .is_some_and(|handle| {
                !TWITTER_RESERVED_PATHS.contains(&handle.as_str().to_ascii_lowercase().as_str())
            })
    }
}

impl SiteDescriptor for Twitter {
    fn id(&self) -> SiteId {
        SiteId::Twitter
    }

    fn groups(&self) -> &'static [ContentGroup] {
        &TWITTER_GROUPS
    }

    fn page_allowed(&self, location: &PageLocation) -> bool {
        let path = location.path.as_str();
        path.contains("/notifications")
            || path.contains("/messages")
            || path.contains("/status/")
            || path.starts_with("/search")
            || Twitter::is_profile_page(path)
    }

    fn keep_visible(&self) -> &'static [Anchor] {
        &TWITTER_KEEP_VISIBLE
    }
}

pub struct Facebook;

static FACEBOOK_GROUPS: [ContentGroup; 1] = [ContentGroup::new(
    "facebook-feed",
    Target::new("div[role=\"main\"] div > div > div > div > div > div > div > div")
        .containing("[role=\"article\"]")
        .first(),
)];

impl SiteDescriptor for Facebook {
    fn id(&self) -> SiteId {
        SiteId::Facebook
    }

    fn groups(&self) -> &'static [ContentGroup] {
        &FACEBOOK_GROUPS
    }
}

pub struct Instagram;

static INSTAGRAM_GROUPS: [ContentGroup; 2] = [
    ContentGroup::new("menu", Target::new("div[role=\"menu\"]"))
        .control("instagram", Placement::Floating),
    ContentGroup::new("main-feed", Target::new("main[role=\"main\"] > div > div"))
        .control("instagram", Placement::Floating),
];

impl SiteDescriptor for Instagram {
    fn id(&self) -> SiteId {
        SiteId::Instagram
    }

    fn groups(&self) -> &'static [ContentGroup] {
        &INSTAGRAM_GROUPS
    }

    fn page_allowed(&self, location: &PageLocation) -> bool {
        location.path.starts_with("/direct/") || location.path.starts_with("/p/")
    }
}

pub struct TikTok;

static TIKTOK_GROUPS: [ContentGroup; 3] = [
    ContentGroup::new("main-feed", Target::new("#main-content-homepage_hot"))
        .inline()
        .control("tiktok", Placement::Floating),
    ContentGroup::new("explore-feed", Target::new("#main-content-explore_page"))
        .inline()
        .control("tiktok", Placement::Floating),
    ContentGroup::new("live-feed", Target::new("#tiktok-live-main-container-id"))
        .inline()
        .control("tiktok", Placement::Floating),
];

const ALL_VIDEOS: Target = Target::new("video");

impl SiteDescriptor for TikTok {
    fn id(&self) -> SiteId {
        SiteId::TikTok
    }

    fn groups(&self) -> &'static [ContentGroup] {
        &TIKTOK_GROUPS
    }

    fn on_hide(&self, page: &dyn Page) {
        page.silence_media(&ALL_VIDEOS, true);
    }
}

pub struct Pinterest;

static PINTEREST_GROUPS: [ContentGroup; 2] = [
    ContentGroup::new(
        "main-feed",
        Target::new(
            "[data-test-id=\"homefeed\"], [data-test-id=\"pinGrid\"], div[role=\"main\"] > div > div > div",
        ),
    )
    .inline()
    .control("pinterest", Placement::Floating),
    ContentGroup::new("explore-feed", Target::new("[data-test-id=\"search-guide-feed\"]"))
        .inline()
        .control("pinterest", Placement::Floating),
];

impl SiteDescriptor for Pinterest {
    fn id(&self) -> SiteId {
        SiteId::Pinterest
    }

    fn groups(&self) -> &'static [ContentGroup] {
        &PINTEREST_GROUPS
    }

    // Only the home feed and the idea/today discovery pages are algorithmic
    fn page_allowed(&self, location: &PageLocation) -> bool {
        let path = location.path.as_str();
        !(path == "/" || path.is_empty() || path.starts_with("/ideas/") || path.starts_with("/today"))
    }
}
