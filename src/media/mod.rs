pub mod camera;
pub mod encoded;
pub mod files;

pub use camera::{
    CameraDevice,
    CameraError,
    Constraints,
    FacingMode,
    Frame,
    MediaStream,
    StillImageCamera,
    SyntheticCamera,
    UnavailableCamera,
};
pub use encoded::{ encode_png, EncodedImage };
pub use files::{ ingest_files, FileEntry, PendingDecode };

use log::{ info, warn };
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no image files in selection")]
    NoImageFiles,
    #[error("not an image: {0}")]
    NotAnImage(String),
    #[error("invalid data uri: {0}")]
    InvalidDataUri(String),
    #[error("file {name} is too large ({size} bytes)")]
    FileTooLarge {
        name: String,
        size: usize,
    },
    #[error("no active camera stream")]
    NoActiveStream,
    #[error("image encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Placeholder,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Owns the one camera stream of a session. Nothing else starts or stops it.
pub struct MediaAcquisition {
    camera: Box<dyn CameraDevice>,
    stream: Option<MediaStream>,
    preview: PreviewState,
}

impl MediaAcquisition {
    pub fn new(camera: Box<dyn CameraDevice>) -> Self {
        Self {
            camera,
            stream: None,
            preview: PreviewState::Placeholder,
        }
    }

    pub fn acquire_camera_stream(&mut self, constraints: &Constraints) -> Result<(), CameraError> {
        if let Some(mut previous) = self.stream.take() {
            previous.stop();
        }
        match self.camera.open(constraints) {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                info!("Camera stream {} bound for preview ({}x{})", stream.id(), width, height);
                self.stream = Some(stream);
                self.preview = PreviewState::Live;
                Ok(())
            }
            Err(e) => {
                warn!("Camera acquisition failed: {}", e);
                self.preview = PreviewState::Placeholder;
                Err(e)
            }
        }
    }

    pub fn capture_frame(&mut self) -> Result<EncodedImage, MediaError> {
        let stream = self.stream.as_mut().ok_or(MediaError::NoActiveStream)?;
        let frame = stream.read_frame()?;
        encode_png(&frame)
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        if let Some(stream) = self.stream.as_mut() {
            stream.set_video_enabled(visibility == Visibility::Visible);
        }
    }

    pub fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("Camera stream {} released", stream.id());
        }
        self.preview = PreviewState::Placeholder;
    }

    pub fn preview(&self) -> PreviewState {
        self.preview
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_acquisition_leaves_placeholder() {
        let mut media = MediaAcquisition::new(
            Box::new(UnavailableCamera::new(CameraError::PermissionDenied))
        );
        assert_eq!(
            media.acquire_camera_stream(&Constraints::default()),
            Err(CameraError::PermissionDenied)
        );
        assert_eq!(media.preview(), PreviewState::Placeholder);
        assert!(matches!(media.capture_frame(), Err(MediaError::NoActiveStream)));
    }

    #[test]
    fn visibility_toggles_track_without_stopping() {
        let mut media = MediaAcquisition::new(Box::new(SyntheticCamera::default()));
        media.acquire_camera_stream(&Constraints::default()).unwrap();

        media.set_visibility(Visibility::Hidden);
        media.set_visibility(Visibility::Hidden);
        let stream = media.stream().unwrap();
        assert!(!stream.video_track().unwrap().enabled);
        assert!(stream.is_active());

        media.set_visibility(Visibility::Visible);
        assert!(media.stream().unwrap().video_track().unwrap().enabled);
        assert!(media.capture_frame().is_ok());
    }

    #[test]
    fn release_stops_and_unbinds() {
        let mut media = MediaAcquisition::new(Box::new(SyntheticCamera::default()));
        media.acquire_camera_stream(&Constraints::default()).unwrap();
        assert_eq!(media.preview(), PreviewState::Live);

        media.release_stream();
        assert!(media.stream().is_none());
        assert_eq!(media.preview(), PreviewState::Placeholder);
    }
}
