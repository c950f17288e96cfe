use std::path::Path;
use std::path::PathBuf;

use image::ImageFormat;
use image::ImageReader;
use listing_protocol::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Other,
}

impl EncodedImageFormat {
    pub fn label(self) -> &'static str {
        match self {
            EncodedImageFormat::Png => "PNG",
            EncodedImageFormat::Jpeg => "JPEG",
            EncodedImageFormat::Gif => "GIF",
            EncodedImageFormat::Webp => "WEBP",
            EncodedImageFormat::Other => "IMG",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            EncodedImageFormat::Png => "image/png",
            EncodedImageFormat::Jpeg => "image/jpeg",
            EncodedImageFormat::Gif => "image/gif",
            EncodedImageFormat::Webp => "image/webp",
            EncodedImageFormat::Other => "application/octet-stream",
        }
    }

    fn from_detected(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => EncodedImageFormat::Png,
            ImageFormat::Jpeg => EncodedImageFormat::Jpeg,
            ImageFormat::Gif => EncodedImageFormat::Gif,
            ImageFormat::WebP => EncodedImageFormat::Webp,
            _ => EncodedImageFormat::Other,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("`{input}` is not a single file path")]
    NotAPath { input: String },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a supported image: {source}", .path.display())]
    NotAnImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Turn what the user typed after `--image` or `add` into a path.
///
/// Accepts `file://` URLs, paths that exist as typed (spaces included), and a single
/// shell-quoted word. Anything that splits into several words is rejected.
pub fn normalize_image_path(input: &str) -> Option<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = url::Url::parse(input)
        && url.scheme() == "file"
    {
        return url.to_file_path().ok();
    }

    let as_typed = Path::new(input);
    if as_typed.exists() {
        return Some(as_typed.to_path_buf());
    }

    let mut words = shlex::Shlex::new(input);
    match (words.next(), words.next()) {
        (Some(path), None) => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Infer an image format for the provided path based on its extension.
pub fn image_format(path: &Path) -> EncodedImageFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => EncodedImageFormat::Png,
        Some("jpg") | Some("jpeg") => EncodedImageFormat::Jpeg,
        Some("gif") => EncodedImageFormat::Gif,
        Some("webp") => EncodedImageFormat::Webp,
        _ => EncodedImageFormat::Other,
    }
}

/// Read an image file into an [`Attachment`].
///
/// The file must decode as an image. Its format is sniffed from the content, so a missing or
/// misleading extension does not matter; the extension only names the MIME type when sniffing
/// finds a format this crate has no MIME type for.
pub fn load_image_attachment(input: &str) -> Result<Attachment, ImageLoadError> {
    let Some(path) = normalize_image_path(input) else {
        return Err(ImageLoadError::NotAPath {
            input: input.to_string(),
        });
    };
    let read_error = |source| ImageLoadError::Read {
        path: path.clone(),
        source,
    };

    let reader = ImageReader::open(&path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(read_error)?;
    let detected = reader.format();
    let (width, height) = reader.into_dimensions().map_err(|source| match source {
        image::ImageError::IoError(source) => read_error(source),
        source => ImageLoadError::NotAnImage {
            path: path.clone(),
            source,
        },
    })?;
    let bytes = std::fs::read(&path).map_err(read_error)?;

    let format = match detected.map(EncodedImageFormat::from_detected) {
        Some(EncodedImageFormat::Other) | None => image_format(&path),
        Some(format) => format,
    };
    tracing::debug!(
        "loaded {} ({width}x{height}, {}, {} bytes)",
        path.display(),
        format.label(),
        bytes.len()
    );

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(Attachment::new(file_name, format.mime_type(), bytes))
}
