//! Server status endpoint.

use super::{CatApi, fetch};
use crate::error::Result;
use crate::models::Status;

impl CatApi {
    /// Server status (`GET /`).
    pub async fn status(&self) -> Result<Status> {
        fetch(self.rest.get("/")).await
    }
}
