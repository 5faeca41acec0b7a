use crate::models::{CANONICAL_ICON_NAME, TASKBAR_ICON_NAME};
use camino::{Utf8Path, Utf8PathBuf};
use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::ImageReader;
use image::imageops::FilterType;
use std::fs;
use std::io::{self, BufWriter, Write};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Square sizes written into every converted icon
pub const ICON_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

/// Errors that can occur while normalizing an icon
#[derive(Error, Debug)]
pub enum IconError {
    #[error("Icon source not found: {0}")]
    SourceNotFound(Utf8PathBuf),

    #[error("Failed to convert {path} to an icon: {reason}")]
    Conversion { path: Utf8PathBuf, reason: String },

    #[error("Icon file operation failed on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IconError {
    fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        IconError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What [`IconService::normalize`] did to produce the canonical icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconAction {
    /// The source already was the canonical icon
    AlreadyCanonical,
    /// The taskbar icon was copied over the canonical icon
    CopiedTaskbarIcon,
    /// An `.ico` file was copied to the canonical location
    Copied,
    /// A raster image was re-encoded into a multi-size icon
    Converted,
}

/// Service that places a usable `icon.ico` in the project directory
///
/// Accepts any raster format the `image` crate can decode. Existing `.ico`
/// files are copied as-is; everything else is converted to RGBA and encoded
/// at each of [`ICON_SIZES`].
#[derive(Debug, Clone, Default)]
pub struct IconService;

impl IconService {
    pub fn new() -> Self {
        Self
    }

    /// Path of the canonical icon inside `project_root`
    pub fn canonical_path(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        project_root.join(CANONICAL_ICON_NAME)
    }

    /// Path of the taskbar icon inside `project_root`
    pub fn taskbar_path(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        project_root.join(TASKBAR_ICON_NAME)
    }

    /// Produce `icon.ico` in `project_root` from `source`.
    ///
    /// # Returns
    /// The canonical icon path and the action taken
    ///
    /// # Errors
    /// - [`IconError::SourceNotFound`] if `source` is not a file
    /// - [`IconError::Conversion`] if `source` cannot be decoded as an image
    /// - [`IconError::Io`] if copying or writing fails
    ///
    /// A source that fails to decode leaves any existing canonical icon in place.
    pub fn normalize(
        &self,
        source: &Utf8Path,
        project_root: &Utf8Path,
    ) -> Result<(Utf8PathBuf, IconAction), IconError> {
        if !source.is_file() {
            return Err(IconError::SourceNotFound(source.to_path_buf()));
        }

        let canonical = self.canonical_path(project_root);
        let taskbar = self.taskbar_path(project_root);

        if same_file(source, &canonical) {
            tracing::info!("Selected icon is already the canonical icon: {}", canonical);
            return Ok((canonical, IconAction::AlreadyCanonical));
        }

        if same_file(source, &taskbar) {
            copy_into_place(source, &canonical)?;
            tracing::info!("Copied taskbar icon {} to {}", source, canonical);
            return Ok((canonical, IconAction::CopiedTaskbarIcon));
        }

        if has_ico_extension(source) {
            copy_into_place(source, &canonical)?;
            tracing::info!("Copied icon {} to {}", source, canonical);
            return Ok((canonical, IconAction::Copied));
        }

        self.convert(source, &canonical)?;
        Ok((canonical, IconAction::Converted))
    }

    /// Re-encode a raster image as a multi-resolution ICO file.
    ///
    /// The format is detected from the file contents, so a misnamed image
    /// still converts.
    pub fn convert(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), IconError> {
        let conversion_error = |reason: String| IconError::Conversion {
            path: source.to_path_buf(),
            reason,
        };

        let reader = ImageReader::open(source)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| IconError::io(source, e))?;
        let rgba = reader
            .decode()
            .map_err(|e| conversion_error(e.to_string()))?
            .to_rgba8();

        let mut icon_dir = IconDir::new(ResourceType::Icon);

        for size in ICON_SIZES {
            let resized = image::imageops::resize(&rgba, size, size, FilterType::Lanczos3);
            let icon_image = IconImage::from_rgba_data(size, size, resized.into_raw());
            let entry = IconDirEntry::encode(&icon_image)
                .map_err(|e| conversion_error(format!("encoding {}x{}: {}", size, size, e)))?;
            icon_dir.add_entry(entry);
        }

        // Everything is encoded before the destination is touched
        replace_file(destination, |writer| icon_dir.write(writer))?;

        tracing::info!(
            "Converted {} to {} ({} sizes)",
            source,
            destination,
            ICON_SIZES.len()
        );
        Ok(())
    }
}

/// Copy `source` over `destination` without exposing a partial file
fn copy_into_place(source: &Utf8Path, destination: &Utf8Path) -> Result<(), IconError> {
    let mut file = fs::File::open(source).map_err(|e| IconError::io(source, e))?;
    replace_file(destination, |writer| io::copy(&mut file, writer).map(|_| ()))
}

/// Write into a temporary file next to `destination`, then rename it into place.
///
/// On failure the previous `destination` is untouched and the temporary file is removed.
fn replace_file<F>(destination: &Utf8Path, write_fn: F) -> Result<(), IconError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let io_error = |e: io::Error| IconError::io(destination, e);
    let dir = destination
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_fn(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(io_error)?;
    }
    temp.persist(destination).map_err(|e| io_error(e.error))?;
    Ok(())
}

fn has_ico_extension(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"))
}

/// Compare two paths after resolving them; missing paths never match
fn same_file(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
