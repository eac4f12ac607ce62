//! Microphone capture through `getUserMedia` and `MediaRecorder`.
//!
//! The capture device is released whenever a [`VoiceRecorder`] goes away:
//! after [`VoiceRecorder::stop`], on [`VoiceRecorder::cancel`], and on drop
//! when the composer unmounts mid-recording.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobEvent, BlobPropertyBag, MediaRecorder, MediaStream, MediaStreamConstraints,
    MediaStreamTrack, RecordingState, Url,
};

const MIME: &str = "audio/webm";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Microphone access denied")]
    PermissionDenied,

    #[error("Microphone unavailable {0}")]
    Unavailable(String),

    #[error("Recorder error {0}")]
    Recorder(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        let name = js_sys::Reflect::get(&value, &JsValue::from_str("name"))
            .ok()
            .and_then(|name| name.as_string());
        match name.as_deref() {
            Some("NotAllowedError") | Some("SecurityError") => Error::PermissionDenied,
            Some("NotFoundError") | Some("NotReadableError") => {
                Error::Unavailable(format!("{value:?}"))
            }
            _ => Error::Recorder(format!("{value:?}")),
        }
    }
}

/// A finished recording, playable through its object url.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceClip {
    pub url: String,
    pub duration_secs: u32,
}

impl VoiceClip {
    /// Releases the object url. Only for clips that will not be sent.
    pub fn discard(self) {
        let _ = Url::revoke_object_url(&self.url);
    }
}

pub struct VoiceRecorder {
    stream: MediaStream,
    recorder: MediaRecorder,
    chunks: Rc<RefCell<Vec<Blob>>>,
    started_at: f64,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl VoiceRecorder {
    pub async fn start() -> Result<Self, Error> {
        let media_devices = leptos::window().navigator().media_devices()?;
        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        let promise = media_devices.get_user_media_with_constraints(&constraints)?;
        let stream: MediaStream = JsFuture::from(promise).await?.dyn_into()?;

        let recorder = match MediaRecorder::new_with_media_stream(&stream) {
            Ok(recorder) => recorder,
            Err(err) => {
                release(&stream);
                return Err(err.into());
            }
        };
        let chunks = Rc::new(RefCell::new(vec![]));
        let on_data = {
            let chunks = chunks.clone();
            Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
                if let Some(data) = event.data() {
                    chunks.borrow_mut().push(data);
                }
            })
        };
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        if let Err(err) = recorder.start() {
            release(&stream);
            return Err(err.into());
        }
        Ok(VoiceRecorder {
            stream,
            recorder,
            chunks,
            started_at: js_sys::Date::now(),
            _on_data: on_data,
        })
    }

    pub fn elapsed_secs(&self) -> u32 {
        ((js_sys::Date::now() - self.started_at) / 1000.0).max(0.0) as u32
    }

    /// Finishes the recording and waits for the last chunk.
    pub async fn stop(self) -> Result<VoiceClip, Error> {
        let duration_secs = self.elapsed_secs();
        let stopped = js_sys::Promise::new(&mut |resolve, _reject| {
            self.recorder.set_onstop(Some(&resolve));
        });
        self.recorder.stop()?;
        JsFuture::from(stopped).await?;
        self.recorder.set_onstop(None);

        let parts = js_sys::Array::new();
        for chunk in self.chunks.borrow().iter() {
            parts.push(chunk);
        }
        let options = BlobPropertyBag::new();
        options.set_type(MIME);
        let blob = Blob::new_with_blob_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;
        Ok(VoiceClip { url, duration_secs })
    }

    /// Drops the recording without producing a clip.
    pub fn cancel(self) {}
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        self.recorder.set_ondataavailable(None);
        if self.recorder.state() != RecordingState::Inactive {
            let _ = self.recorder.stop();
        }
        release(&self.stream);
    }
}

fn release(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        track.unchecked_into::<MediaStreamTrack>().stop();
    }
}
