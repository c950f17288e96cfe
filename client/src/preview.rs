//! Scoped, revocable previews of attached images.
//!
//! A [`PreviewHandle`] is created when an image is attached and must be handed back to the
//! store that issued it exactly once. Handles are deliberately not `Clone`, so the owner of the
//! handle is the only one able to revoke it.

use std::io;
use std::io::Cursor;
use std::path::Path;
use std::path::PathBuf;

use image::ImageFormat;
use listing_protocol::Attachment;
use tempfile::TempDir;

/// Longest edge, in pixels, of the thumbnails written by [`TempDirPreviewStore`].
const DEFAULT_PREVIEW_EDGE: u32 = 256;

#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    uri: String,
    path: Option<PathBuf>,
}

impl PreviewHandle {
    pub fn new(id: u64, uri: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            id,
            uri: uri.into(),
            path,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Location a renderer can load the preview from.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Backing file, for stores that keep previews on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Issues and releases preview handles.
pub trait PreviewStore {
    fn create(&mut self, attachment: &Attachment) -> io::Result<PreviewHandle>;

    fn revoke(&mut self, handle: PreviewHandle);
}

/// Writes a PNG thumbnail of each attachment into a private temporary directory.
///
/// Revoking a handle deletes its file; dropping the store removes the directory with anything
/// still in it.
pub struct TempDirPreviewStore {
    dir: TempDir,
    next_id: u64,
    max_edge: u32,
}

impl TempDirPreviewStore {
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("listing-previews-")
            .tempdir()?;
        Ok(Self {
            dir,
            next_id: 0,
            max_edge: DEFAULT_PREVIEW_EDGE,
        })
    }

    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

impl PreviewStore for TempDirPreviewStore {
    fn create(&mut self, attachment: &Attachment) -> io::Result<PreviewHandle> {
        self.next_id += 1;
        let id = self.next_id;

        let path = match render_thumbnail(attachment.bytes(), self.max_edge) {
            Ok(png) => {
                let path = self.dir.path().join(format!("preview-{id}.png"));
                std::fs::write(&path, png)?;
                path
            }
            Err(err) => {
                // Keep a handle for undecodable content so the 1:1 pairing with attachments holds.
                tracing::debug!(
                    "thumbnail for {} failed, storing original bytes: {err}",
                    attachment.file_name()
                );
                let path = self.dir.path().join(format!("preview-{id}.bin"));
                std::fs::write(&path, attachment.bytes())?;
                path
            }
        };

        let uri = url::Url::from_file_path(&path)
            .map(String::from)
            .unwrap_or_else(|()| path.display().to_string());
        Ok(PreviewHandle::new(id, uri, Some(path)))
    }

    fn revoke(&mut self, handle: PreviewHandle) {
        let Some(path) = handle.path() else {
            return;
        };
        if let Err(err) = std::fs::remove_file(path) {
            tracing::warn!("failed to remove preview {}: {err}", path.display());
        }
    }
}

fn render_thumbnail(bytes: &[u8], max_edge: u32) -> image::ImageResult<Vec<u8>> {
    let thumbnail = image::load_from_memory(bytes)?.thumbnail(max_edge, max_edge);
    let mut out = Cursor::new(Vec::new());
    thumbnail.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
