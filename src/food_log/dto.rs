use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub months: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub moved: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
