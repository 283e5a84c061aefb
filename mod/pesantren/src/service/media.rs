use pondok_core::ServiceError;

use super::PesantrenService;

/// An uploaded file, already read off the wire by the API layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl PesantrenService {
    /// Store an uploaded image under `{bucket}/{owner}/{timestamp}-{slug}.{ext}`
    /// and return its public URL. A missing owner gets a `temp-` prefix so
    /// orphaned pre-registration uploads are recognizable.
    pub fn store_image(
        &self,
        bucket: &str,
        owner: Option<&str>,
        file: &UploadedFile,
    ) -> Result<String, ServiceError> {
        if file.data.is_empty() {
            return Err(ServiceError::Validation("uploaded file is empty".into()));
        }
        let ts = chrono::Utc::now().timestamp_millis();
        let owner = match owner {
            Some(o) => o.to_string(),
            None => format!("temp-{}", ts),
        };
        let (stem, ext) = split_filename(&file.filename);
        let mut name = slugify(stem);
        if name.is_empty() {
            name = "file".into();
        }
        let key = format!("{}/{}/{}-{}.{}", bucket, owner, ts, name, ext);
        self.blob.put(&key, &file.data).map_err(|e| {
            ServiceError::Upload(format!("storing '{}' failed: {}", file.filename, e))
        })?;
        Ok(self.public_url(&key))
    }

    /// Public URL for a blob key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", self.media_base_url, key)
    }

    /// Reverse of [`public_url`]: the blob key behind one of our own media
    /// URLs, or None for external URLs.
    ///
    /// [`public_url`]: PesantrenService::public_url
    pub(crate) fn blob_key_for_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/media/", self.media_base_url);
        url.strip_prefix(&prefix)
            .filter(|k| !k.is_empty())
            .map(String::from)
    }

    /// Read a media blob for serving. Missing keys are NotFound.
    pub fn read_media(&self, key: &str) -> Result<Vec<u8>, ServiceError> {
        let data = self
            .blob
            .get(key)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        data.ok_or_else(|| ServiceError::NotFound(format!("media/{}", key)))
    }
}

/// Lowercase, keep `[a-z0-9]`, map runs of anything else to a single dash.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Content type for serving a stored blob, keyed on its extension.
pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn split_filename(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
        _ => (name, "bin"),
    }
}
