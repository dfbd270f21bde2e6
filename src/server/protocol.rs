use serde::{Deserialize, Serialize};

/// Body of `POST /inpaint`. Both fields are base64, optionally carrying a
/// `data:<mime>;base64,` prefix.
#[derive(Debug, Deserialize)]
pub struct InpaintRequest {
    pub image: String,
    pub mask: String,
}

#[derive(Debug, Serialize)]
pub struct InpaintResponse {
    pub result: String,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}
