use std::rc::Rc;
use yew::prelude::*;

use crate::api::{ImageLibrary, UploadError};

pub enum LibraryAction {
    /// Initial listing from the server
    Loaded(Vec<String>),
    UploadFinished(Result<String, UploadError>),
}

impl Reducible for ImageLibrary {
    type Action = LibraryAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            LibraryAction::Loaded(urls) => Rc::new(ImageLibrary::from_urls(urls)),
            LibraryAction::UploadFinished(result) => {
                let mut next = (*self).clone();
                if next.record_upload(&result) {
                    Rc::new(next)
                } else {
                    self
                }
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ImageListProps {
    pub images: Vec<String>,
    /// Emits the URL of the clicked image
    pub on_pick: Callback<String>,
}

#[function_component(ImageList)]
pub fn image_list(props: &ImageListProps) -> Html {
    html! {
        <div class="w-64 flex-none bg-white border-r border-gray-300 p-4 overflow-y-auto">
            <h2 class="text-lg font-semibold pb-3 mb-4 border-b border-gray-200">{"Images"}</h2>
            <ul id="listImage" class="space-y-2">
                {
                    props.images.iter().enumerate().map(|(idx, url)| {
                        let on_pick = props.on_pick.clone();
                        let picked = url.clone();
                        let onclick = Callback::from(move |_: MouseEvent| {
                            on_pick.emit(picked.clone());
                        });

                        html! {
                            <li key={format!("{}-{}", idx, url)}>
                                <img
                                    src={url.clone()}
                                    {onclick}
                                    class="img-rounded w-full rounded cursor-pointer border border-gray-200 hover:border-blue-300"
                                />
                            </li>
                        }
                    }).collect::<Html>()
                }
            </ul>
            if props.images.is_empty() {
                <p class="text-sm text-gray-500 text-center py-4">
                    {"No images yet. Upload one below."}
                </p>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_replaces_list() {
        let library = Rc::new(ImageLibrary::from_urls(vec!["/old.png".to_string()]));
        let next = library.reduce(LibraryAction::Loaded(vec![
            "/a.png".to_string(),
            "/b.png".to_string(),
        ]));
        assert_eq!(next.urls(), ["/a.png".to_string(), "/b.png".to_string()]);
    }

    #[test]
    fn test_uploaded_appends() {
        let library = Rc::new(ImageLibrary::from_urls(vec!["/a.png".to_string()]));
        let next = library.reduce(LibraryAction::UploadFinished(Ok("/c.png".to_string())));
        assert_eq!(next.len(), 2);
        assert_eq!(next.urls()[1], "/c.png");
    }

    #[test]
    fn test_failed_upload_keeps_list() {
        let library = Rc::new(ImageLibrary::from_urls(vec!["/a.png".to_string()]));
        let next = library.clone().reduce(LibraryAction::UploadFinished(Err(
            UploadError::InvalidFileType("text/plain".to_string()),
        )));
        assert!(Rc::ptr_eq(&library, &next));
        assert_eq!(next.urls(), ["/a.png".to_string()]);
    }
}
