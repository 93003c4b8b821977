//! Image listing and upload against the backend's HTTP endpoints.
//!
//! `GET /images` answers with a JSON array of image URLs. `POST /uploads`
//! takes a multipart form with the file in the `upload` field and answers
//! `{"file": "<url>"}`, or an error body `{"message": {"code": ...}}`.

use std::future::Future;
use std::pin::Pin;

use gloo::net::http::Request;
use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::FormData;

use crate::config::EditorConfig;

/// Boxed non-`Send` future; everything here runs on the browser's single thread.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UploadError {
    #[error("You have to select a picture from your local machine!")]
    NoFileSelected,
    #[error("You have to select image file type!")]
    InvalidFileType(String),
    /// The endpoint refused the upload; the code is shown to the user as is.
    #[error("{code}")]
    Rejected { code: String },
    #[error("Upload failed: {0}")]
    Network(String),
    #[error("Upload response did not contain a file URL")]
    MalformedResponse,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A file picked for upload.
pub trait UploadFile {
    fn name(&self) -> String;
    fn mime_type(&self) -> String;
}

impl UploadFile for web_sys::File {
    fn name(&self) -> String {
        web_sys::File::name(self)
    }

    fn mime_type(&self) -> String {
        self.type_()
    }
}

pub trait ImageApi {
    type File: UploadFile;

    fn list_images(&self) -> LocalBoxFuture<'_, Result<Vec<String>, ApiError>>;

    /// Send `file` to the upload endpoint and return its public URL.
    /// Use [`upload_image`], which checks the file type first.
    fn send_upload<'a>(
        &'a self,
        file: &'a Self::File,
    ) -> LocalBoxFuture<'a, Result<String, UploadError>>;
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Reject anything that is not an image before it reaches the network.
pub fn check_file_type<F: UploadFile + ?Sized>(file: &F) -> Result<(), UploadError> {
    let mime = file.mime_type();
    if is_image_mime(&mime) {
        Ok(())
    } else {
        Err(UploadError::InvalidFileType(mime))
    }
}

/// Validate the form's file selection before anything is sent.
pub fn check_selection<F: UploadFile>(file: Option<&F>) -> Result<&F, UploadError> {
    let file = file.ok_or(UploadError::NoFileSelected)?;
    check_file_type(file)?;
    Ok(file)
}

pub async fn upload_image<A: ImageApi>(api: &A, file: &A::File) -> Result<String, UploadError> {
    check_file_type(file)?;
    let url = api.send_upload(file).await?;
    log::info!("Uploaded {} as {}", file.name(), url);
    Ok(url)
}

#[derive(Deserialize)]
struct UploadResponse {
    file: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    code: serde_json::Value,
}

/// Interpret the upload endpoint's answer.
pub fn parse_upload_response(status: u16, body: &str) -> Result<String, UploadError> {
    if (200..300).contains(&status) {
        return serde_json::from_str::<UploadResponse>(body)
            .ok()
            .and_then(|r| r.file)
            .ok_or(UploadError::MalformedResponse);
    }

    let code = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            message: ErrorMessage {
                code: serde_json::Value::String(code),
            },
        }) => code,
        Ok(ErrorResponse { message }) => message.code.to_string(),
        Err(_) => format!("HTTP {}", status),
    };
    Err(UploadError::Rejected { code })
}

pub fn parse_image_list(body: &str) -> Result<Vec<String>, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Image URLs offered for placement, in the order they became known.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageLibrary {
    urls: Vec<String>,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_urls(urls: Vec<String>) -> Self {
        Self { urls }
    }

    pub fn push(&mut self, url: String) {
        self.urls.push(url);
    }

    /// Append the URL of a successful upload. Failed uploads leave the
    /// library as it was; returns whether anything was added.
    pub fn record_upload(&mut self, result: &Result<String, UploadError>) -> bool {
        match result {
            Ok(url) => {
                self.push(url.clone());
                true
            }
            Err(_) => false,
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// [`ImageApi`] over the same-origin HTTP endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpImageApi {
    images_endpoint: String,
    upload_endpoint: String,
    upload_field: String,
}

impl HttpImageApi {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            images_endpoint: config.images_endpoint.clone(),
            upload_endpoint: config.upload_endpoint.clone(),
            upload_field: config.upload_field.clone(),
        }
    }

    async fn post_form(&self, file: &web_sys::File) -> Result<String, UploadError> {
        let js_err = |e: JsValue| UploadError::Network(format!("{:?}", e));
        let net_err = |e: gloo::net::Error| UploadError::Network(e.to_string());

        let form = FormData::new().map_err(js_err)?;
        form.append_with_blob(&self.upload_field, file)
            .map_err(js_err)?;

        let response = Request::post(&self.upload_endpoint)
            .body(form)
            .map_err(net_err)?
            .send()
            .await
            .map_err(net_err)?;
        let status = response.status();
        let body = response.text().await.map_err(net_err)?;
        parse_upload_response(status, &body)
    }
}

impl ImageApi for HttpImageApi {
    type File = web_sys::File;

    fn list_images(&self) -> LocalBoxFuture<'_, Result<Vec<String>, ApiError>> {
        Box::pin(async move {
            let net_err = |e: gloo::net::Error| ApiError::Network(e.to_string());
            let response = Request::get(&self.images_endpoint)
                .send()
                .await
                .map_err(net_err)?;
            if !response.ok() {
                return Err(ApiError::Status(response.status()));
            }
            let body = response.text().await.map_err(net_err)?;
            parse_image_list(&body)
        })
    }

    fn send_upload<'a>(
        &'a self,
        file: &'a Self::File,
    ) -> LocalBoxFuture<'a, Result<String, UploadError>> {
        Box::pin(self.post_form(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    struct FakeFile {
        name: &'static str,
        mime: &'static str,
    }

    impl UploadFile for FakeFile {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn mime_type(&self) -> String {
            self.mime.to_string()
        }
    }

    struct FakeApi {
        answer: Result<String, UploadError>,
        sent: Cell<usize>,
    }

    impl FakeApi {
        fn answering(answer: Result<String, UploadError>) -> Self {
            Self {
                answer,
                sent: Cell::new(0),
            }
        }
    }

    impl ImageApi for FakeApi {
        type File = FakeFile;

        fn list_images(&self) -> LocalBoxFuture<'_, Result<Vec<String>, ApiError>> {
            Box::pin(async { Ok(vec!["/uploads/a.png".to_string()]) })
        }

        fn send_upload<'a>(
            &'a self,
            _file: &'a FakeFile,
        ) -> LocalBoxFuture<'a, Result<String, UploadError>> {
            self.sent.set(self.sent.get() + 1);
            let answer = self.answer.clone();
            Box::pin(async move { answer })
        }
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/JPEG"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(""));
        assert!(!is_image_mime("application/x-image"));
    }

    #[test]
    fn test_text_file_is_rejected_before_sending() {
        let api = FakeApi::answering(Ok("/uploads/notes.txt".to_string()));
        let mut library = ImageLibrary::from_urls(vec!["/uploads/a.png".to_string()]);
        let file = FakeFile {
            name: "notes.txt",
            mime: "text/plain",
        };

        let result = block_on(upload_image(&api, &file));
        library.record_upload(&result);

        assert_eq!(result, Err(UploadError::InvalidFileType("text/plain".to_string())));
        assert_eq!(api.sent.get(), 0);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_successful_upload_extends_library() {
        let api = FakeApi::answering(Ok("/uploads/cat.png".to_string()));
        let mut library = ImageLibrary::new();
        let file = FakeFile {
            name: "cat.png",
            mime: "image/png",
        };

        let result = block_on(upload_image(&api, &file));
        library.record_upload(&result);

        assert_eq!(api.sent.get(), 1);
        assert_eq!(library.urls(), ["/uploads/cat.png".to_string()]);
    }

    #[test]
    fn test_rejected_upload_leaves_library() {
        let api = FakeApi::answering(Err(UploadError::Rejected {
            code: "LIMIT_FILE_SIZE".to_string(),
        }));
        let mut library = ImageLibrary::new();
        let file = FakeFile {
            name: "huge.png",
            mime: "image/png",
        };

        let result = block_on(upload_image(&api, &file));
        library.record_upload(&result);

        assert!(library.is_empty());
        assert_eq!(result.unwrap_err().to_string(), "LIMIT_FILE_SIZE");
    }

    #[test]
    fn test_check_selection() {
        assert_eq!(
            check_selection::<FakeFile>(None).err(),
            Some(UploadError::NoFileSelected)
        );

        let notes = FakeFile {
            name: "notes.txt",
            mime: "text/plain",
        };
        assert_eq!(
            check_selection(Some(&notes)).err(),
            Some(UploadError::InvalidFileType("text/plain".to_string()))
        );

        let cat = FakeFile {
            name: "cat.png",
            mime: "image/png",
        };
        assert_eq!(check_selection(Some(&cat)).map(|f| f.name()), Ok("cat.png".to_string()));
    }

    #[test]
    fn test_record_upload() {
        let mut library = ImageLibrary::from_urls(vec!["/uploads/a.png".to_string()]);

        assert!(!library.record_upload(&Err(UploadError::MalformedResponse)));
        assert_eq!(library.len(), 1);

        assert!(library.record_upload(&Ok("/uploads/b.png".to_string())));
        assert_eq!(
            library.urls(),
            ["/uploads/a.png".to_string(), "/uploads/b.png".to_string()]
        );
    }

    #[test]
    fn test_list_images() {
        let api = FakeApi::answering(Err(UploadError::MalformedResponse));
        let urls = block_on(api.list_images()).unwrap();
        assert_eq!(ImageLibrary::from_urls(urls).len(), 1);
    }

    #[test]
    fn test_parse_upload_success() {
        assert_eq!(
            parse_upload_response(200, r#"{"file":"/uploads/x.png"}"#),
            Ok("/uploads/x.png".to_string())
        );
    }

    #[test]
    fn test_parse_upload_success_without_file() {
        assert_eq!(parse_upload_response(201, "{}"), Err(UploadError::MalformedResponse));
        assert_eq!(parse_upload_response(200, "oops"), Err(UploadError::MalformedResponse));
    }

    #[test]
    fn test_parse_upload_error_codes() {
        assert_eq!(
            parse_upload_response(400, r#"{"message":{"code":"LIMIT_UNEXPECTED_FILE"}}"#),
            Err(UploadError::Rejected {
                code: "LIMIT_UNEXPECTED_FILE".to_string()
            })
        );
        assert_eq!(
            parse_upload_response(500, r#"{"message":{"code":413}}"#),
            Err(UploadError::Rejected {
                code: "413".to_string()
            })
        );
        assert_eq!(
            parse_upload_response(502, "<html>Bad gateway</html>"),
            Err(UploadError::Rejected {
                code: "HTTP 502".to_string()
            })
        );
    }

    #[test]
    fn test_parse_image_list() {
        assert_eq!(
            parse_image_list(r#"["/a.png","/b.jpg"]"#).unwrap(),
            vec!["/a.png".to_string(), "/b.jpg".to_string()]
        );
        assert!(parse_image_list("[]").unwrap().is_empty());
        assert!(matches!(parse_image_list("{}"), Err(ApiError::Decode(_))));
    }
}
