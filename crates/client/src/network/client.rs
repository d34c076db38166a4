//! HTTP client for the camera web service
//!
//! Every device action except the live frame feed is a plain HTTP request
//! against the camera's base URL. Commands are fire-and-forget; the other
//! calls decode a small JSON body or carry a file.

use common::{Error, Result};
use protocol::{
    Calibration, CalibrationResponse, Command, FILE_LIST_PATH, FileEntry, IS_RECORDING_PATH,
    Method, RecordingStatus, SET_TEMPERATURE_PATH, Target, coordinates_path, delete_path,
    download_path,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A downloaded capture
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: bytes::Bytes,
    /// Content-Type reported by the device, if any
    pub content_type: Option<String>,
}

/// Client for one camera
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CameraClient {
    http: reqwest::Client,
    base_url: String,
}

impl CameraClient {
    /// Create a client for the device at `base_url`
    ///
    /// # Example
    /// ```no_run
    /// use client::network::CameraClient;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() -> common::Result<()> {
    ///     let camera = CameraClient::new("http://192.168.1.20:5000", Duration::from_secs(30))?;
    ///     let status = camera.recording_status().await?;
    ///     println!("recording: {}", status.recording);
    ///     Ok(())
    /// }
    /// ```
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Cannot create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: Method, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path);
        let request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Delete => self.http.delete(&url),
        };
        debug!("{:?} {}", method, url);
        request.send().await.map_err(|e| transport_error(&url, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, exact_ok: bool) -> Result<T> {
        let response = self.send(Method::Get, path).await?;
        let response = if exact_ok {
            require_ok(response)?
        } else {
            require_success(response)?
        };
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(format!("{}: {}", url, e)))
    }

    /// Issue a device command
    ///
    /// The response is ignored. Any failure is logged and swallowed so a
    /// button press never surfaces an error.
    pub async fn dispatch(&self, command: Command) {
        match self.send(command.method(), command.path()).await {
            Ok(response) => {
                debug!("{} answered {}", command, response.status());
            }
            Err(e) => warn!("Command {} failed: {}", command, e),
        }
    }

    /// Query whether the camera is recording
    ///
    /// Any 2xx status is accepted.
    pub async fn recording_status(&self) -> Result<RecordingStatus> {
        self.get_json(IS_RECORDING_PATH, false).await
    }

    /// Fetch the saved captures
    ///
    /// Anything but HTTP 200 is an error.
    pub async fn file_list(&self) -> Result<Vec<FileEntry>> {
        let files: Vec<FileEntry> = self.get_json(FILE_LIST_PATH, true).await?;
        debug!("Device lists {} file(s)", files.len());
        Ok(files)
    }

    /// Fetch a capture's content
    pub async fn download_file(&self, filename: &str) -> Result<Download> {
        let response = self.send(Method::Get, &download_path(filename)).await?;
        let response = require_ok(response)?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, e))?;

        Ok(Download {
            bytes,
            content_type,
        })
    }

    /// Download a capture into `dir` and return the written path
    ///
    /// Only the last path component of `filename` is used locally.
    pub async fn save_download(&self, filename: &str, dir: &Path) -> Result<PathBuf> {
        let download = self.download_file(filename).await?;
        let path = dir.join(local_name(filename)?);

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &download.bytes).await?;

        info!(
            "Saved {} ({} bytes, {}) to {}",
            filename,
            download.bytes.len(),
            download.content_type.as_deref().unwrap_or("unknown type"),
            path.display()
        );
        Ok(path)
    }

    /// Delete a capture
    ///
    /// Succeeds only on exactly HTTP 200; any other status is
    /// [`Error::Status`].
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        let response = self.send(Method::Delete, &delete_path(filename)).await?;
        require_ok(response)?;
        info!("Deleted {}", filename);
        Ok(())
    }

    /// Report a click on the video image
    pub async fn send_coordinates(&self, target: Target) -> Result<()> {
        let response = self.send(Method::Get, &coordinates_path(target)).await?;
        debug!(
            "Coordinates ({}, {}) answered {}",
            target.x,
            target.y,
            response.status()
        );
        Ok(())
    }

    /// Pin a temperature reading to a known value
    pub async fn calibrate(&self, calibration: Calibration) -> Result<CalibrationResponse> {
        let url = self.url(SET_TEMPERATURE_PATH);
        let response = self
            .http
            .post(&url)
            .json(&calibration)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let response = require_success(response)?;
        response
            .json::<CalibrationResponse>()
            .await
            .map_err(|e| Error::Decode(format!("{}: {}", url, e)))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport(format!("{} timed out", url))
    } else {
        Error::Transport(format!("{}: {}", url, err))
    }
}

fn status_error(response: &reqwest::Response) -> Error {
    Error::Status {
        status: response.status().as_u16(),
        url: response.url().to_string(),
    }
}

fn require_ok(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status() == StatusCode::OK {
        Ok(response)
    } else {
        Err(status_error(&response))
    }
}

fn require_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(&response))
    }
}

/// Local file name for a server-side filename
fn local_name(filename: &str) -> Result<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .ok_or_else(|| Error::Other(format!("Cannot derive a local name from '{}'", filename)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = CameraClient::new("http://camera.local:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://camera.local:5000");
        assert_eq!(client.url("/is_recording"), "http://camera.local:5000/is_recording");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("TC001_1.png").unwrap(), "TC001_1.png");
        assert_eq!(local_name("captures/TC001_1.mp4").unwrap(), "TC001_1.mp4");
        assert_eq!(local_name("..\\evil.png").unwrap(), "evil.png");
        assert!(local_name("").is_err());
        assert!(local_name("dir/").is_err());
        assert!(local_name("..").is_err());
    }
}
