use common::{Profile, UpdateProfileRequest};
use tracing::{debug, trace};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        trace!("Fetching profile");
        self.get("/profile/", Vec::new()).await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<Profile, ApiError> {
        debug!("Updating profile");
        self.put("/profile/", request).await
    }
}
