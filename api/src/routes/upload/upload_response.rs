use serde::Serialize;
use vision_chat::ImageAnalysis;

pub const UPLOAD_MESSAGE: &str = "Image uploaded and analyzed successfully";

/// Response payload for /upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub analysis: ImageAnalysis,
    pub message: &'static str,
}
