use futures::future::BoxFuture;
use futures::FutureExt;
use log::{ debug, warn };
use std::path::{ Path, PathBuf };
use std::time::Duration;

use super::encoded::{ is_image_mime, EncodedImage };
use super::MediaError;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One dropped or picked file, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub mime: Option<String>,
    pub source: FileSource,
}

impl FileEntry {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime: mime_from_extension(path).map(str::to_string),
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(|m| m.to_ascii_lowercase()),
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.as_deref().map(is_image_mime).unwrap_or(false)
    }
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "txt" => Some("text/plain"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

pub type PendingDecode = BoxFuture<'static, (String, Result<EncodedImage, MediaError>)>;

/// Keeps the image-typed entries and returns one decode per entry, each delayed by
/// `index * stagger` so queued files are delivered one after another.
pub fn ingest_files(
    files: Vec<FileEntry>,
    stagger: Duration
) -> Result<Vec<PendingDecode>, MediaError> {
    let total = files.len();
    let accepted: Vec<FileEntry> = files
        .into_iter()
        .filter(|f| {
            let keep = f.is_image();
            if !keep {
                debug!("Skipping non-image file {} ({:?})", f.name, f.mime);
            }
            keep
        })
        .collect();

    if accepted.is_empty() {
        warn!("None of the {} selected files is an image", total);
        return Err(MediaError::NoImageFiles);
    }

    Ok(
        accepted
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let delay = stagger * (index as u32);
                (async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let name = entry.name.clone();
                    (name, decode_file(entry).await)
                }).boxed()
            })
            .collect()
    )
}

pub async fn decode_file(entry: FileEntry) -> Result<EncodedImage, MediaError> {
    let mime = entry.mime.clone().ok_or_else(|| MediaError::NotAnImage(entry.name.clone()))?;
    let bytes = match entry.source {
        FileSource::Path(path) => tokio::fs::read(&path).await?,
        FileSource::Bytes(bytes) => bytes,
    };
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::FileTooLarge { name: entry.name, size: bytes.len() });
    }
    EncodedImage::from_bytes(&mime, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_from_extension(Path::new("a/B.JPG")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("notes.txt")), Some("text/plain"));
        assert_eq!(mime_from_extension(Path::new("README")), None);
    }

    #[test]
    fn no_images_is_rejected() {
        let files = vec![
            FileEntry::from_bytes("a.txt", Some("text/plain"), b"hi".to_vec()),
            FileEntry::from_bytes("blob", None, vec![1, 2])
        ];
        assert!(matches!(ingest_files(files, Duration::ZERO), Err(MediaError::NoImageFiles)));
        assert!(matches!(ingest_files(Vec::new(), Duration::ZERO), Err(MediaError::NoImageFiles)));
    }

    #[tokio::test]
    async fn accepted_files_decode_verbatim() {
        let files = vec![
            FileEntry::from_bytes("a.txt", Some("text/plain"), b"hi".to_vec()),
            FileEntry::from_bytes("b.png", Some("image/png"), vec![1, 2, 3])
        ];
        let pending = ingest_files(files, Duration::from_millis(1)).unwrap();
        assert_eq!(pending.len(), 1);

        let mut results = Vec::new();
        for decode in pending {
            results.push(decode.await);
        }
        let (name, image) = &results[0];
        assert_eq!(name, "b.png");
        assert_eq!(image.as_ref().unwrap().to_data_uri(), "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn oversized_files_fail_to_decode() {
        let entry = FileEntry::from_bytes("huge.png", Some("image/png"), vec![0; MAX_IMAGE_BYTES + 1]);
        assert!(matches!(decode_file(entry).await, Err(MediaError::FileTooLarge { .. })));
    }
}
