use yew::prelude::*;

use crate::components::CanvasBoard;
use crate::config::EditorConfig;

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| EditorConfig::default());

    html! {
        <CanvasBoard config={(*config).clone()} />
    }
}
