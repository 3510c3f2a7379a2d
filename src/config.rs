/// Compile-time settings shared by the content, background and popup contexts

/// Seconds revealed content stays visible before it is hidden again
pub const REVEAL_SECONDS: u32 = 600;

/// Fallback reconciliation period for mutations the observer misses
pub const RECONCILE_INTERVAL_MS: i32 = 1000;

/// Countdown tick period
pub const COUNTDOWN_TICK_MS: i32 = 1000;

/// Delay before the background retries a message the content script wasn't ready for
pub const MESSAGE_RETRY_DELAY_MS: i32 = 1000;

/// Class applied by the `CssClass` hide strategy (styled in content.css)
pub const HIDDEN_CLASS: &str = "hidden-by-extension";

pub const CONTROL_CLASS: &str = "algorithm-escape-toggle-container";
pub const CONTROL_BUTTON_CLASS: &str = "algorithm-escape-toggle";
pub const CONTROL_TEXT_CLASS: &str = "algorithm-escape-text";
pub const CONTROL_COUNTDOWN_CLASS: &str = "algorithm-escape-countdown";
pub const CONTROL_CLOSE_CLASS: &str = "algorithm-escape-close";
pub const CONTROL_FLOATING_CLASS: &str = "algorithm-escape-floating";
pub const MODAL_CLASS: &str = "algorithm-escape-modal";
pub const MODAL_CONTENT_CLASS: &str = "algorithm-escape-modal-content";
pub const MODAL_BUTTON_CLASS: &str = "algorithm-escape-modal-button";

/// Storage key for strict mode, plus the key older releases wrote
pub const STRICT_KEY: &str = "strict";
pub const LEGACY_STRICT_KEY: &str = "hardcore";
pub const THEME_KEY: &str = "theme";

pub const WELCOME_URL: &str = "https://escapethealgorithm.org/welcome.html";
pub const CHANGELOG_URL: &str = "https://escapethealgorithm.org/changelog.html";

pub const REPORT_EMAIL: &str = "glitchfix@escapethealgorithm.org";
pub const REPORT_SUBJECT: &str = "Issue Report: Escape the Algorithm Extension";
pub const REPORT_BODY: &str = "Please describe the issue you encountered:";

pub const INSTALL_NOTIFICATION_TITLE: &str = "Pin Escape the Algorithm";
pub const INSTALL_NOTIFICATION_MESSAGE: &str = "For easy access, pin our extension to your toolbar!";
