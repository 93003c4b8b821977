mod canvas_board;
mod image_list;
mod toolbar;
mod upload_form;

pub use canvas_board::CanvasBoard;
pub use image_list::{ImageList, LibraryAction};
pub use toolbar::Toolbar;
pub use upload_form::UploadForm;
