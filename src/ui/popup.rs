/// Popup UI: per-site switches, strict mode, theme and issue reporting

use crate::bridge;
use crate::config::{REPORT_BODY, REPORT_EMAIL, REPORT_SUBJECT, STRICT_KEY, THEME_KEY};
use crate::dom;
use crate::prefs::{StoredPreferences, Theme};
use crate::site::SiteId;
use crate::ui::components::SettingSwitch;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Ready,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let prefs = use_state(StoredPreferences::default);
    let prefers_dark = use_memo((), |_| {
        web_sys::window().is_some_and(|window| dom::prefers_dark(&window))
    });
    let theme = Theme::resolve(prefs.theme(), *prefers_dark);

    // Load stored settings on mount
    {
        let state = state.clone();
        let prefs = prefs.clone();
        let prefers_dark = *prefers_dark;
        use_effect_with((), move |_| {
            spawn_local(async move {
                match bridge::load_preferences().await {
                    Ok(loaded) => {
                        apply_theme(Theme::resolve(loaded.theme(), prefers_dark));
                        prefs.set(loaded);
                        state.set(AppState::Ready);
                    }
                    Err(e) => {
                        log::error!("Failed to load settings: {}", e);
                        apply_theme(Theme::resolve(None, prefers_dark));
                        state.set(AppState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_site = {
        let state = state.clone();
        let prefs = prefs.clone();
        move |site: SiteId| {
            let state = state.clone();
            let prefs = prefs.clone();
            Callback::from(move |enabled: bool| {
                let mut next = (*prefs).clone();
                next.set_site(site, enabled);
                prefs.set(next);
                save(site.key(), enabled, state.clone());
            })
        }
    };

    let on_strict = {
        let state = state.clone();
        let prefs = prefs.clone();
        Callback::from(move |strict: bool| {
            let mut next = (*prefs).clone();
            next.set_strict(strict);
            prefs.set(next);
            save(STRICT_KEY, strict, state.clone());
        })
    };

    let on_theme = {
        let state = state.clone();
        let prefs = prefs.clone();
        Callback::from(move |dark: bool| {
            let theme = if dark { Theme::Dark } else { Theme::Light };
            let mut next = (*prefs).clone();
            next.set_theme(theme);
            prefs.set(next);
            apply_theme(theme);
            save(THEME_KEY, theme.key(), state.clone());
        })
    };

    let on_report = Callback::from(move |_| {
        spawn_local(async move {
            if let Err(e) = bridge::open_tab(&report_mailto()).await {
                log::warn!("Failed to open report link: {}", e);
            }
        });
    });

    let is_loading = *state == AppState::Loading;

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Escape the Algorithm"}</h1>

            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Ready => html! {}
            }}

            <div class="settings-section">
                <h2 class="section-title">{"Hide feeds on"}</h2>
                {for SiteId::ALL.into_iter().map(|site| html! {
                    <SettingSwitch
                        id={format!("site-{}", site.key())}
                        label={site.label()}
                        checked={prefs.site_enabled(site)}
                        onchange={on_site(site)}
                        disabled={is_loading}
                    />
                })}
            </div>

            <div class="settings-section">
                <h2 class="section-title">{"Options"}</h2>
                <SettingSwitch
                    id="strict"
                    label="Strict mode (no show button)"
                    checked={prefs.strict()}
                    onchange={on_strict}
                    disabled={is_loading}
                />
                <SettingSwitch
                    id="theme"
                    label="Dark theme"
                    checked={theme == Theme::Dark}
                    onchange={on_theme}
                    disabled={is_loading}
                />
            </div>

            <Button onclick={on_report} variant={ButtonVariant::Link}>
                {"Report an issue"}
            </Button>

            <p class="footer-popup">
                {format!("Escape the Algorithm v{}", env!("CARGO_PKG_VERSION"))}
            </p>
        </div>
    }
}

// Helper functions

fn save<T: serde::Serialize + 'static>(key: &'static str, value: T, state: UseStateHandle<AppState>) {
    spawn_local(async move {
        if let Err(e) = bridge::save_setting(key, &value).await {
            log::error!("Failed to save {}: {}", key, e);
            state.set(AppState::Error(format!("Failed to save setting: {}", e)));
        }
    });
}

fn apply_theme(theme: Theme) {
    let Some(body) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        return;
    };
    let (add, remove) = match theme {
        Theme::Dark => ("dark-theme", "light-theme"),
        Theme::Light => ("light-theme", "dark-theme"),
    };
    let classes = body.class_list();
    if let Err(e) = classes.remove_1(remove).and_then(|_| classes.add_1(add)) {
        log::debug!("Failed to switch theme class: {:?}", e);
    }
}

fn encode_component(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Pre-filled mail link for the "report issue" action
pub fn report_mailto() -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        REPORT_EMAIL,
        encode_component(REPORT_SUBJECT),
        encode_component(REPORT_BODY)
    )
}
