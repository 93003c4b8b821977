use gloo::dialogs::alert;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::api::{check_selection, upload_image, HttpImageApi, UploadError};

#[derive(Properties, PartialEq)]
pub struct UploadFormProps {
    pub api: HttpImageApi,
    /// Emits the outcome of every submit, after any alert was shown
    pub on_upload: Callback<Result<String, UploadError>>,
}

fn report_failure(err: &UploadError) {
    log::warn!("Upload failed: {:?}", err);
    alert(&err.to_string());
}

#[function_component(UploadForm)]
pub fn upload_form(props: &UploadFormProps) -> Html {
    let input_ref = use_node_ref();
    let uploading = use_state(|| false);

    let onsubmit = {
        let input_ref = input_ref.clone();
        let uploading = uploading.clone();
        let api = props.api.clone();
        let on_upload = props.on_upload.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let picked = input_ref
                .cast::<HtmlInputElement>()
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            let file = match check_selection(picked.as_ref()) {
                Ok(file) => file.clone(),
                Err(err) => {
                    report_failure(&err);
                    on_upload.emit(Err(err));
                    return;
                }
            };

            let api = api.clone();
            let uploading = uploading.clone();
            let on_upload = on_upload.clone();
            uploading.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let result = upload_image(&api, &file).await;
                if let Err(err) = &result {
                    report_failure(err);
                }
                on_upload.emit(result);
                uploading.set(false);
            });
        })
    };

    html! {
        <form id="formUpload" {onsubmit} class="p-4 border-t border-gray-300 bg-white space-y-2">
            <input
                id="fileUpload"
                ref={input_ref}
                type="file"
                accept="image/*"
                class="w-full text-sm"
            />
            <button
                type="submit"
                disabled={*uploading}
                class="w-full px-4 py-2 bg-blue-500 text-white rounded-lg text-sm font-medium hover:bg-blue-600 transition-colors disabled:opacity-50"
            >
                { if *uploading { "Uploading..." } else { "Upload" } }
            </button>
        </form>
    }
}
