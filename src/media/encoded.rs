use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ DynamicImage, ImageFormat, RgbaImage };
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::io::Cursor;

use super::camera::Frame;
use super::MediaError;

/// A `data:image/<fmt>;base64,...` buffer, the one image format passed between
/// media, session and gateway.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EncodedImage {
    mime: String,
    payload: String,
}

impl EncodedImage {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, MediaError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(MediaError::NotAnImage(mime));
        }
        Ok(Self {
            mime,
            payload: STANDARD.encode(bytes),
        })
    }

    pub fn parse(uri: &str) -> Result<Self, MediaError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| MediaError::InvalidDataUri("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| MediaError::InvalidDataUri("missing payload separator".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| MediaError::InvalidDataUri("payload is not base64".to_string()))?
            .to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(MediaError::NotAnImage(mime));
        }
        STANDARD.decode(payload).map_err(|e| MediaError::InvalidDataUri(e.to_string()))?;

        Ok(Self {
            mime,
            payload: payload.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn decode(&self) -> Result<Vec<u8>, MediaError> {
        STANDARD.decode(&self.payload).map_err(|e| MediaError::InvalidDataUri(e.to_string()))
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.payload)
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.to_data_uri()
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = MediaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EncodedImage::parse(&value)
    }
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/") && mime.len() > "image/".len()
}

/// Rasterizes a raw RGBA frame into a PNG data URI at the frame's own size.
pub fn encode_png(frame: &Frame) -> Result<EncodedImage, MediaError> {
    let buffer = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone()).ok_or_else(||
        MediaError::Encode(
            format!("frame buffer does not match {}x{}", frame.width, frame.height)
        )
    )?;
    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(buffer)
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| MediaError::Encode(e.to_string()))?;

    EncodedImage::from_bytes("image/png", png.get_ref())
}
