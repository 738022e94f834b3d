pub mod notice;

pub use notice::Notice;

use log::{ debug, error, info, warn };
use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::config::SessionConfig;
use crate::gateway::{ ChatTurn, Gateway };
use crate::location::{ GeoPosition, LocationProvider };
use crate::media::{ ingest_files, EncodedImage, FileEntry, MediaAcquisition, MediaError, Visibility };
use crate::models::chat::{ format_context, ChatMessage, Transcript };
use crate::persona::emotion;
use crate::persona::{
    self,
    responder,
    APOLOGY,
    LOCATION_UNKNOWN,
    SKY_IS_SILENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    Camera,
    File(String),
}

/// A photo waiting in the preview overlay for the user to use or discard.
#[derive(Debug, Clone)]
pub struct StagedPhoto {
    pub image: EncodedImage,
    pub source: PhotoSource,
}

#[derive(Debug, Clone)]
pub enum Command {
    Awaken,
    Back,
    Capture,
    SelectFiles(Vec<FileEntry>),
    Retake,
    UsePhoto,
    SendMessage(String),
    AskWeather,
    SenseMood(String),
    VisibilityChanged(Visibility),
}

/// Result of a spawned task, applied to the session when the task finishes.
#[derive(Debug)]
pub enum Completion {
    PhotoDecoded {
        name: String,
        result: Result<EncodedImage, MediaError>,
    },
    SpiritMessage(String),
    ChatReplied {
        text: String,
        conversation_id: Option<i64>,
    },
}

pub struct Session {
    config: SessionConfig,
    screen: Screen,
    overlay: Option<StagedPhoto>,
    transcript: Transcript,
    media: MediaAcquisition,
    gateway: Gateway,
    location: Arc<dyn LocationProvider>,
    position: Option<GeoPosition>,
    conversation_id: Option<i64>,
    started: bool,
    notices: Vec<Notice>,
    pending: JoinSet<Completion>,
    rng: StdRng,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        media: MediaAcquisition,
        gateway: Gateway,
        location: Arc<dyn LocationProvider>
    ) -> Self {
        Self {
            config,
            screen: Screen::Home,
            overlay: None,
            transcript: Transcript::new(),
            media,
            gateway,
            location,
            position: None,
            conversation_id: None,
            started: false,
            notices: Vec::new(),
            pending: JoinSet::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Makes every random draw of this session reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Samples the location and opens the camera. Runs once; a second call does nothing.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        match self.location.current_position().await {
            Ok(position) => {
                info!("Location acquired: ({}, {})", position.latitude, position.longitude);
                self.position = Some(position);
            }
            Err(e) => {
                warn!("Location unavailable: {}", e);
                self.notices.push(Notice::from(&e));
            }
        }

        if let Err(e) = self.media.acquire_camera_stream(&self.config.constraints) {
            self.notices.push(Notice::from(&e));
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!("Dispatching {:?}", command);
        match command {
            Command::Awaken => self.awaken(),
            Command::Back => self.back(),
            Command::Capture => self.capture(),
            Command::SelectFiles(files) => self.select_files(files),
            Command::Retake => self.retake(),
            Command::UsePhoto => self.use_photo(),
            Command::SendMessage(text) => self.send_message(&text),
            Command::AskWeather => self.ask_weather(),
            Command::SenseMood(text) => self.sense_mood(&text),
            Command::VisibilityChanged(visibility) => self.visibility_changed(visibility),
        }
    }

    pub fn awaken(&mut self) {
        if self.screen == Screen::Home {
            self.screen = Screen::Chat;
        }
    }

    pub fn back(&mut self) {
        if self.screen == Screen::Chat {
            self.screen = Screen::Home;
        }
    }

    pub fn capture(&mut self) {
        match self.media.capture_frame() {
            Ok(image) => self.stage(image, PhotoSource::Camera),
            Err(MediaError::NoActiveStream) => self.notices.push(Notice::CameraNotReady),
            Err(e) => {
                warn!("Capture failed: {}", e);
                self.notices.push(Notice::CameraNotReady);
            }
        }
    }

    pub fn select_files(&mut self, files: Vec<FileEntry>) {
        match ingest_files(files, self.config.file_stagger) {
            Ok(decodes) => {
                for decode in decodes {
                    self.pending.spawn(async move {
                        let (name, result) = decode.await;
                        Completion::PhotoDecoded { name, result }
                    });
                }
            }
            Err(MediaError::NoImageFiles) => self.notices.push(Notice::NoImageFiles),
            Err(e) => warn!("File selection failed: {}", e),
        }
    }

    pub fn retake(&mut self) {
        self.overlay = None;
    }

    pub fn use_photo(&mut self) {
        if let Some(photo) = self.overlay.take() {
            self.screen = Screen::Chat;
            self.submit_photo(photo.image);
        }
    }

    pub fn send_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let context = format_context(&self.transcript, self.config.context_len);
        self.transcript.push(ChatMessage::user(text));

        match self.gateway.remote() {
            Some(remote) => {
                let turn = ChatTurn {
                    message: text.to_string(),
                    image: None,
                    context,
                    position: self.position,
                    conversation_id: self.conversation_id,
                };
                self.pending.spawn(async move {
                    match remote.chat(turn).await {
                        Ok(reply) =>
                            Completion::ChatReplied {
                                text: reply.text,
                                conversation_id: reply.conversation_id,
                            },
                        Err(e) => {
                            warn!("Chat failed: {}", e);
                            Completion::SpiritMessage(APOLOGY.to_string())
                        }
                    }
                });
            }
            None => {
                let reply = responder::respond(text, &mut self.rng);
                self.reply_after_thinking(reply.to_string());
            }
        }
    }

    pub fn submit_photo(&mut self, image: EncodedImage) {
        self.transcript.push(ChatMessage::user_photo("", image.clone()));
        let fallback = persona::photo_reply(&mut self.rng).to_string();

        match self.gateway.remote() {
            Some(remote) => {
                self.pending.spawn(async move {
                    match remote.identify_image(&image, None).await {
                        Ok(resp) => Completion::SpiritMessage(persona::describe_identification(&resp)),
                        Err(e) => {
                            warn!("Image recognition failed: {}", e);
                            Completion::SpiritMessage(fallback)
                        }
                    }
                });
            }
            None => self.reply_after_thinking(fallback),
        }
    }

    pub fn ask_weather(&mut self) {
        let position = match self.position {
            Some(position) => position,
            None => {
                self.transcript.push(ChatMessage::spirit(LOCATION_UNKNOWN));
                return;
            }
        };

        match self.gateway.remote() {
            Some(remote) => {
                self.pending.spawn(async move {
                    let text = match remote.weather(position).await {
                        Ok(resp) => persona::summarize_weather(&resp).unwrap_or_else(|| SKY_IS_SILENT.to_string()),
                        Err(e) => {
                            warn!("Weather lookup failed: {}", e);
                            SKY_IS_SILENT.to_string()
                        }
                    };
                    Completion::SpiritMessage(text)
                });
            }
            None => self.reply_after_thinking(SKY_IS_SILENT.to_string()),
        }
    }

    pub fn sense_mood(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.transcript.push(ChatMessage::user(text));
        let local = persona::describe_local_mood(emotion::analyze(text).primary, &mut self.rng);

        match self.gateway.remote() {
            Some(remote) => {
                let mut rng = StdRng::seed_from_u64(self.rng.gen());
                let text = text.to_string();
                self.pending.spawn(async move {
                    let reading = match remote.analyze_emotion(&text).await {
                        Ok(payload) => persona::describe_mood_payload(&payload, &mut rng),
                        Err(e) => {
                            warn!("Emotion analysis failed: {}", e);
                            None
                        }
                    };
                    Completion::SpiritMessage(reading.unwrap_or(local))
                });
            }
            None => self.reply_after_thinking(local),
        }
    }

    pub fn visibility_changed(&mut self, visibility: Visibility) {
        self.media.set_visibility(visibility);
    }

    pub fn teardown(&mut self) {
        self.media.release_stream();
    }

    /// Waits for the next spawned task and applies it. Returns `false` when nothing is pending.
    pub async fn next_completion(&mut self) -> bool {
        match self.pending.join_next().await {
            Some(Ok(completion)) => {
                self.apply(completion);
                true
            }
            Some(Err(e)) => {
                error!("Session task failed: {}", e);
                true
            }
            None => false,
        }
    }

    /// Applies every pending completion.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::PhotoDecoded { name, result: Ok(image) } => {
                self.stage(image, PhotoSource::File(name));
            }
            Completion::PhotoDecoded { name, result: Err(e) } => {
                warn!("Could not read {}: {}", name, e);
                self.notices.push(Notice::PhotoUnreadable(name));
            }
            Completion::SpiritMessage(text) => {
                self.transcript.push(ChatMessage::spirit(text));
            }
            Completion::ChatReplied { text, conversation_id } => {
                if conversation_id.is_some() {
                    self.conversation_id = conversation_id;
                }
                self.transcript.push(ChatMessage::spirit(text));
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn staged_photo(&self) -> Option<&StagedPhoto> {
        self.overlay.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn media(&self) -> &MediaAcquisition {
        &self.media
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn position(&self) -> Option<GeoPosition> {
        self.position
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    fn stage(&mut self, image: EncodedImage, source: PhotoSource) {
        if self.overlay.is_some() {
            debug!("Replacing staged photo");
        }
        self.overlay = Some(StagedPhoto { image, source });
    }

    fn thinking_delay(&mut self) -> Duration {
        let min = self.config.thinking_min.as_millis() as u64;
        let max = (self.config.thinking_max.as_millis() as u64).max(min);
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    fn reply_after_thinking(&mut self, text: String) {
        let delay = self.thinking_delay();
        self.pending.spawn(async move {
            tokio::time::sleep(delay).await;
            Completion::SpiritMessage(text)
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.media.release_stream();
    }
}
