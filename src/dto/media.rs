use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart body for image uploads.
#[derive(Debug, ToSchema)]
pub struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MediaQuery {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageUploaded {
    pub image_url: String,
}
