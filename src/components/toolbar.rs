use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ToolbarProps {
    pub on_add_text: Callback<()>,
}

#[function_component(Toolbar)]
pub fn toolbar(props: &ToolbarProps) -> Html {
    let onclick = {
        let on_add_text = props.on_add_text.clone();
        Callback::from(move |_: MouseEvent| on_add_text.emit(()))
    };

    html! {
        <div class="flex items-center gap-2 p-2 border-b border-gray-300 bg-white">
            <button
                id="addText"
                type="button"
                {onclick}
                class="px-3 py-1 bg-blue-500 text-white rounded text-sm font-medium hover:bg-blue-600 transition-colors"
            >
                {"Add text"}
            </button>
            <span class="text-xs text-gray-500">
                {"Click an object to select it, drag to move, press Delete to remove."}
            </span>
        </div>
    }
}
