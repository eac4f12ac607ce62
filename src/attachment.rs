use crate::state::{FileRef, MessageDraft, Payload};
use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not create object url {0}")]
    ObjectUrl(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::ObjectUrl(format!("{value:?}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub url: String,
}

impl PickedFile {
    /// Wraps a picked DOM file behind a local object url.
    pub fn from_file(file: &web_sys::File) -> Result<Self, Error> {
        let url = web_sys::Url::create_object_url_with_blob(file)?;
        Ok(PickedFile {
            name: file.name(),
            size: file.size() as u64,
            mime: file.type_(),
            url,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn into_draft(self) -> MessageDraft {
        let is_image = self.is_image();
        let text = if is_image {
            format!("📷 {}", self.name)
        } else {
            format!("📎 {}", self.name)
        };
        let file = FileRef {
            url: self.url,
            name: self.name,
            size: self.size,
        };
        MessageDraft {
            text: Some(text),
            payload: if is_image {
                Payload::Image(file)
            } else {
                Payload::File(file)
            },
        }
    }
}

/// Human readable size with one decimal, in KB below one MiB and MB above.
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB * KIB {
        format!("{:.1} KB", bytes / KIB)
    } else {
        format!("{:.1} MB", bytes / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MessageKind;

    fn picked(name: &str, mime: &str) -> PickedFile {
        PickedFile {
            name: name.to_owned(),
            size: 3 * 1024 * 1024,
            mime: mime.to_owned(),
            url: "blob:local/1".to_owned(),
        }
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(0), "0.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024 - 1), "1024.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(5 * 1024 * 1024 / 2), "2.5 MB");
    }

    #[test]
    fn image_draft() {
        let draft = picked("cat.png", "image/png").into_draft();
        assert_eq!(draft.payload.kind(), MessageKind::Image);
        assert_eq!(draft.text.as_deref(), Some("📷 cat.png"));
        assert!(draft.is_sendable());
    }

    #[test]
    fn file_draft() {
        let draft = picked("notes.pdf", "application/pdf").into_draft();
        assert_eq!(draft.text.as_deref(), Some("📎 notes.pdf"));
        match draft.payload {
            Payload::File(file) => {
                assert_eq!(file.name, "notes.pdf");
                assert_eq!(file.size, 3 * 1024 * 1024);
                assert_eq!(file.url, "blob:local/1");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
