use image::RgbaImage;
use log::{ debug, info };
use std::path::{ Path, PathBuf };
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NotFound,
    #[error("camera failure: {0}")]
    Other(String),
}

/// Raw RGBA pixels of one video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CameraError> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(
                CameraError::Other(
                    format!("frame {}x{} expects {} bytes, got {}", width, height, expected, rgba.len())
                )
            );
        }
        Ok(Self { width, height, rgba })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub kind: TrackKind,
    pub enabled: bool,
    pub state: TrackState,
}

impl Track {
    fn live(kind: TrackKind) -> Self {
        Self { kind, enabled: true, state: TrackState::Live }
    }
}

pub trait FrameSource: Send {
    fn native_size(&self) -> (u32, u32);
    fn grab(&mut self) -> Result<Frame, CameraError>;
}

pub trait CameraDevice: Send + Sync {
    fn open(&self, constraints: &Constraints) -> Result<MediaStream, CameraError>;
}

/// A live camera feed: its tracks plus the source frames are read from.
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<Track>,
    source: Box<dyn FrameSource>,
}

impl MediaStream {
    pub fn video(source: Box<dyn FrameSource>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks: vec![Track::live(TrackKind::Video)],
            source,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn video_track(&self) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == TrackKind::Video)
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.source.native_size()
    }

    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|t| t.state == TrackState::Live)
    }

    pub fn set_video_enabled(&mut self, enabled: bool) {
        for track in self.tracks.iter_mut().filter(|t| t.kind == TrackKind::Video) {
            track.enabled = enabled;
        }
    }

    pub fn stop(&mut self) {
        for track in self.tracks.iter_mut() {
            track.state = TrackState::Ended;
            track.enabled = false;
        }
        debug!("Stream {} stopped", self.id);
    }

    pub fn read_frame(&mut self) -> Result<Frame, CameraError> {
        match self.video_track() {
            Some(track) if track.state == TrackState::Live && track.enabled => self.source.grab(),
            Some(track) if track.state == TrackState::Live => {
                Err(CameraError::Other("video track is disabled".to_string()))
            }
            _ => Err(CameraError::Other("stream has ended".to_string())),
        }
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream").field("id", &self.id).field("tracks", &self.tracks).finish()
    }
}

/// Uses an image on disk as the camera; every frame is that picture.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

struct StillImageSource {
    picture: RgbaImage,
}

impl FrameSource for StillImageSource {
    fn native_size(&self) -> (u32, u32) {
        self.picture.dimensions()
    }

    fn grab(&mut self) -> Result<Frame, CameraError> {
        let (width, height) = self.picture.dimensions();
        Frame::new(width, height, self.picture.as_raw().clone())
    }
}

impl CameraDevice for StillImageCamera {
    fn open(&self, _constraints: &Constraints) -> Result<MediaStream, CameraError> {
        let picture = image::open(&self.path).map_err(|e| {
            match e {
                image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    CameraError::NotFound
                }
                image::ImageError::IoError(io) if
                    io.kind() == std::io::ErrorKind::PermissionDenied
                => {
                    CameraError::PermissionDenied
                }
                other => CameraError::Other(other.to_string()),
            }
        })?;
        let picture = picture.to_rgba8();
        info!(
            "Camera opened from {} ({}x{})",
            self.path.display(),
            picture.width(),
            picture.height()
        );
        Ok(MediaStream::video(Box::new(StillImageSource { picture })))
    }
}

/// Deterministic gradient frames, for demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(64, 48)
    }
}

struct SyntheticSource {
    width: u32,
    height: u32,
    sequence: u8,
}

impl FrameSource for SyntheticSource {
    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab(&mut self) -> Result<Frame, CameraError> {
        self.sequence = self.sequence.wrapping_add(1);
        let mut rgba = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                rgba.push(((x * 255) / self.width) as u8);
                rgba.push(((y * 255) / self.height) as u8);
                rgba.push(self.sequence);
                rgba.push(255);
            }
        }
        Frame::new(self.width, self.height, rgba)
    }
}

impl CameraDevice for SyntheticCamera {
    fn open(&self, _constraints: &Constraints) -> Result<MediaStream, CameraError> {
        Ok(
            MediaStream::video(
                Box::new(SyntheticSource {
                    width: self.width,
                    height: self.height,
                    sequence: 0,
                })
            )
        )
    }
}

/// Stands in when no camera is configured; opening always fails.
#[derive(Debug, Clone)]
pub struct UnavailableCamera {
    failure: CameraError,
}

impl UnavailableCamera {
    pub fn new(failure: CameraError) -> Self {
        Self { failure }
    }
}

impl CameraDevice for UnavailableCamera {
    fn open(&self, _constraints: &Constraints) -> Result<MediaStream, CameraError> {
        Err(self.failure.clone())
    }
}
