//! Test utilities for topdon-remote
//!
//! Provides mock data and helper functions for testing across crates.
//!
//! # Example
//!
//! ```
//! use common::test_utils::create_mock_file_entry;
//!
//! # fn main() {
//! let entry = create_mock_file_entry("img1", "jpg");
//! assert_eq!(entry.filename, "img1.jpg");
//! # }
//! ```

use image::{ImageBuffer, Rgb};
use protocol::{FileEntry, Frame};
use std::future::Future;
use std::time::Duration;

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a mock FileEntry whose filename is `name.ending`
pub fn create_mock_file_entry(name: &str, ending: &str) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        ending: ending.to_string(),
        filename: format!("{}.{}", name, ending),
    }
}

/// Create a list of captures named like the camera names them
///
/// Alternates between photos and recordings.
pub fn create_mock_file_list(count: usize) -> Vec<FileEntry> {
    (0..count)
        .map(|i| {
            let ending = if i % 2 == 0 { "png" } else { "mp4" };
            create_mock_file_entry(&format!("TC001_{:04}", i), ending)
        })
        .collect()
}

/// Encode a solid-color JPEG of the given size
///
/// # Example
/// ```
/// use common::test_utils::create_mock_jpeg;
///
/// let jpeg = create_mock_jpeg(8, 4, [255, 0, 0]);
/// assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
/// ```
pub fn create_mock_jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("encoding an in-memory JPEG cannot fail");
    bytes
}

/// Create a live frame payload holding a solid-color JPEG
pub fn create_mock_frame(width: u32, height: u32, color: [u8; 3]) -> Frame {
    Frame::from_jpeg(&create_mock_jpeg(width, height, color))
}

/// Run a future with a timeout
///
/// # Example
/// ```
/// use common::test_utils::{with_timeout, DEFAULT_TEST_TIMEOUT};
///
/// #[tokio::main]
/// async fn main() {
///     let result = with_timeout(DEFAULT_TEST_TIMEOUT, async { 42 }).await.unwrap();
///     assert_eq!(result, 42);
/// }
/// ```
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { duration })
}

/// Error returned when a test times out
#[derive(Debug)]
pub struct TimeoutError {
    /// The timeout duration that was exceeded
    pub duration: Duration,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Test timed out after {:?}", self.duration)
    }
}

impl std::error::Error for TimeoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_file_list() {
        let files = create_mock_file_list(3);
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].filename, "TC001_0000.png");
        assert_eq!(files[1].filename, "TC001_0001.mp4");
    }

    #[test]
    fn test_mock_frame_decodes() {
        let frame = create_mock_frame(16, 8, [0, 128, 255]);
        let jpeg = frame.decode_jpeg().unwrap();
        let img = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 8);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(DEFAULT_TEST_TIMEOUT, async { 42 }).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_failure() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            42
        })
        .await;

        assert!(result.is_err());
    }
}
