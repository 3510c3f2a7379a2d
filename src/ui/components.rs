/// Reusable UI components

use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SettingSwitchProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub checked: bool,
    pub onchange: Callback<bool>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// A labelled on/off switch using PatternFly's switch markup
#[function_component(SettingSwitch)]
pub fn setting_switch(props: &SettingSwitchProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                onchange.emit(input.checked());
            }
        })
    };

    html! {
        <label class="pf-v5-c-switch setting-switch" for={props.id.clone()}>
            <input
                class="pf-v5-c-switch__input"
                type="checkbox"
                id={props.id.clone()}
                checked={props.checked}
                disabled={props.disabled}
                onchange={onchange}
            />
            <span class="pf-v5-c-switch__toggle"></span>
            <span class="pf-v5-c-switch__label">{props.label.clone()}</span>
        </label>
    }
}
