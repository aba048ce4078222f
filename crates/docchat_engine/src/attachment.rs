use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use thiserror::Error;

use crate::Attachment;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} does not name a file", .0.display())]
    NoFileName(PathBuf),
}

/// Media type sent for a file, picked from its extension.
pub fn media_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
        _ => FALLBACK_MEDIA_TYPE,
    }
}

/// Read a local file into an upload attachment.
///
/// Only PDFs are expected, but other files are passed through with a warning.
pub fn load_attachment(path: &Path) -> Result<Attachment, LoadError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoadError::NoFileName(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let media_type = media_type_for(path);
    if media_type != PDF_MEDIA_TYPE {
        engine_warn!("{:?} does not look like a PDF; uploading anyway", path);
    }
    engine_info!("Loaded {:?} ({} bytes)", path, bytes.len());

    Ok(Attachment {
        file_name,
        media_type: media_type.to_string(),
        bytes,
    })
}
