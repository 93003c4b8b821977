use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent};
use yew::prelude::*;

use crate::api::{HttpImageApi, ImageApi, ImageLibrary, UploadError};
use crate::components::{ImageList, LibraryAction, Toolbar, UploadForm};
use crate::config::EditorConfig;
use crate::editor::{dispatcher, Editor, EditorEvent, SharedEditor};
use crate::persistence::{self, Autosave, BrowserStorage};
use crate::render::DomRenderer;

const DELETE_KEY: &str = "Delete";

type EditorSlot = Rc<RefCell<Option<SharedEditor<DomRenderer>>>>;

/// Run `f` against the mounted editor, if any.
fn with_editor(slot: &EditorSlot, f: impl FnOnce(&mut Editor<DomRenderer>)) {
    let Some(shared) = slot.borrow().clone() else {
        log::warn!("Canvas is not mounted yet");
        return;
    };
    match shared.try_borrow_mut() {
        Ok(mut editor) => f(&mut editor),
        Err(_) => log::warn!("Editor busy, action dropped"),
    };
}

#[derive(Properties, PartialEq)]
pub struct CanvasBoardProps {
    #[prop_or_default]
    pub config: EditorConfig,
}

#[function_component(CanvasBoard)]
pub fn canvas_board(props: &CanvasBoardProps) -> Html {
    let config = props.config.clone();
    let api = HttpImageApi::new(&config);
    let images = use_reducer(ImageLibrary::new);
    let canvas_ref = use_node_ref();
    let editor: EditorSlot = use_mut_ref(|| None);

    // Mount the editor on the canvas element: restore the snapshot, bind the
    // delete key and start the autosave timer
    {
        let canvas_ref = canvas_ref.clone();
        let editor = editor.clone();
        let config = config.clone();

        use_effect_with((), move |_| {
            let mut bindings = None;

            if let Some(canvas) = canvas_ref.cast::<HtmlElement>() {
                let store = persistence::restore(&BrowserStorage, &config.storage_key);
                let font_size = config.text_font_size_px;
                let shared: SharedEditor<DomRenderer> = Rc::new_cyclic(|weak| {
                    let renderer = DomRenderer::new(canvas, dispatcher(weak.clone()), font_size);
                    RefCell::new(Editor::restore(store, renderer))
                });

                let autosave = Autosave::start(
                    Rc::downgrade(&shared),
                    BrowserStorage,
                    config.storage_key.clone(),
                    config.autosave_interval(),
                );

                let sink = dispatcher(Rc::downgrade(&shared));
                let keyup = EventListener::new(&gloo_utils::document(), "keyup", move |event| {
                    if let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() {
                        if keyboard_event.key() == DELETE_KEY {
                            sink(EditorEvent::DeleteKey);
                        }
                    }
                });

                *editor.borrow_mut() = Some(shared);
                bindings = Some((autosave, keyup));
            } else {
                log::error!("Canvas element missing, editor not started");
            }

            move || {
                drop(bindings);
                if let Some(shared) = editor.borrow_mut().take() {
                    if let Ok(editor) = shared.try_borrow() {
                        let key = &config.storage_key;
                        if let Err(e) = persistence::flush(editor.store(), &BrowserStorage, key) {
                            log::error!("Final save failed: {}", e);
                        }
                    }
                }
            }
        });
    }

    // Fetch the image list once
    {
        let images = images.clone();
        let api = api.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api.list_images().await {
                    Ok(urls) => {
                        log::info!("Loaded {} image(s)", urls.len());
                        images.dispatch(LibraryAction::Loaded(urls));
                    }
                    Err(e) => log::warn!("Could not load image list: {}", e),
                }
            });
            || ()
        });
    }

    let on_pick = {
        let editor = editor.clone();
        Callback::from(move |url: String| {
            with_editor(&editor, |editor| {
                editor.add_picture(&url);
            });
        })
    };

    let on_add_text = {
        let editor = editor.clone();
        let default_text = config.default_text.clone();
        Callback::from(move |_: ()| {
            let Some(text) = gloo::dialogs::prompt("Enter your text", Some(&default_text)) else {
                return;
            };
            with_editor(&editor, |editor| {
                editor.add_text(&text);
            });
        })
    };

    let on_upload = {
        let images = images.clone();
        Callback::from(move |result: Result<String, UploadError>| {
            images.dispatch(LibraryAction::UploadFinished(result));
        })
    };

    html! {
        <div class="flex flex-col h-screen">
            <Toolbar {on_add_text} />
            <div class="flex flex-1 min-h-0">
                <div class="flex flex-col">
                    <ImageList images={images.urls().to_vec()} {on_pick} />
                    <UploadForm {api} {on_upload} />
                </div>
                <div
                    id="canvas"
                    ref={canvas_ref}
                    class="relative flex-1 overflow-hidden bg-gray-50 select-none"
                />
            </div>
        </div>
    }
}
