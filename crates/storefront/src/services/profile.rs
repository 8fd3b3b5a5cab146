//! Member profile images.

use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use rocky_gym_core::UserId;

use crate::models::{NewProfileImage, ProfileImage};
use crate::supabase::{Backend, BackendError, Filter, Query, Table};

/// Largest accepted image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("image is empty")]
    Empty,

    #[error("image is larger than {MAX_IMAGE_BYTES} bytes")]
    TooLarge,
}

/// File extension for an accepted image content type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Profile operations for one member.
pub struct ProfileService<'a> {
    backend: &'a dyn Backend,
    bucket: &'a str,
    user: UserId,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, bucket: &'a str, user: UserId) -> Self {
        Self {
            backend,
            bucket,
            user,
        }
    }

    fn rows(&self) -> Table<'a, ProfileImage> {
        Table::new(self.backend)
    }

    async fn current(&self) -> Result<Option<ProfileImage>, BackendError> {
        self.rows()
            .fetch_one(Query::all().eq("userId", self.user.to_string()))
            .await
    }

    /// URL of the member's profile image, if they have one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn profile_image(&self) -> Result<Option<String>, BackendError> {
        Ok(self.current().await?.map(|row| row.image))
    }

    /// Store a new profile image and point the member's row at it.
    ///
    /// Returns the public URL of the new image.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty, oversized or unsupported
    /// images, or `ProfileError::Backend` if the upload or row write fails.
    #[instrument(skip(self, bytes), fields(user = %self.user, size = bytes.len()))]
    pub async fn upload_profile_image(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProfileError> {
        if bytes.is_empty() {
            return Err(ProfileError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ProfileError::TooLarge);
        }
        let ext = extension_for(content_type)
            .ok_or_else(|| ProfileError::UnsupportedType(content_type.to_string()))?;

        let previous = self.current().await?;

        let path = format!("{}/{}.{ext}", self.user, Uuid::new_v4());
        let stored = self
            .backend
            .upload(self.bucket, &path, bytes, content_type)
            .await?;
        let url = self.backend.public_url(self.bucket, &stored);

        if let Err(e) = self.point_row_at(previous.as_ref(), &url).await {
            // Nothing points at the new object.
            if let Err(remove_err) = self.backend.remove(self.bucket, &[stored]).await {
                warn!(error = %remove_err, "Failed to remove orphaned profile image");
            }
            return Err(e.into());
        }
        info!(path = %stored, "Profile image updated");

        if let Some(old_path) = previous.and_then(|row| self.object_path(&row.image))
            && let Err(e) = self.backend.remove(self.bucket, &[old_path]).await
        {
            warn!(error = %e, "Failed to remove previous profile image");
        }

        Ok(url)
    }

    async fn point_row_at(
        &self,
        previous: Option<&ProfileImage>,
        url: &str,
    ) -> Result<(), BackendError> {
        match previous {
            Some(row) => {
                self.rows()
                    .update(
                        &Filter::eq("id", row.id.as_i64()),
                        &serde_json::json!({ "image": url }),
                    )
                    .await?;
            }
            None => {
                self.rows()
                    .insert(&NewProfileImage {
                        user_id: self.user,
                        image: url.to_string(),
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// Object path inside the bucket for one of our public URLs.
    fn object_path(&self, url: &str) -> Option<String> {
        let prefix = self.backend.public_url(self.bucket, "");
        url.strip_prefix(&prefix)
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::supabase::{InMemoryBackend, TableOp};

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[tokio::test]
    async fn test_first_upload_inserts_row() {
        let backend = InMemoryBackend::new();
        let user = UserId::new(Uuid::new_v4());
        let profile = ProfileService::new(&backend, "profiles", user);

        assert_eq!(profile.profile_image().await.unwrap(), None);

        let url = profile
            .upload_profile_image(vec![0x89, 0x50, 0x4e, 0x47], "image/png")
            .await
            .unwrap();
        assert!(url.starts_with(&format!("memory://rocky-gym/profiles/{user}/")));
        assert!(url.ends_with(".png"));
        assert_eq!(profile.profile_image().await.unwrap(), Some(url));
    }

    #[tokio::test]
    async fn test_second_upload_replaces_row_and_object() {
        let backend = InMemoryBackend::new();
        let user = UserId::new(Uuid::new_v4());
        let profile = ProfileService::new(&backend, "profiles", user);

        let first = profile
            .upload_profile_image(vec![1], "image/png")
            .await
            .unwrap();
        let second = profile
            .upload_profile_image(vec![2], "image/webp")
            .await
            .unwrap();

        assert_eq!(backend.rows("profileImage").await.len(), 1);
        assert_eq!(profile.profile_image().await.unwrap(), Some(second.clone()));

        let first_path = profile.object_path(&first).unwrap();
        let second_path = profile.object_path(&second).unwrap();
        assert!(backend.object("profiles", &first_path).await.is_none());
        assert!(backend.object("profiles", &second_path).await.is_some());
    }

    #[tokio::test]
    async fn test_rejects_bad_images() {
        let backend = InMemoryBackend::new();
        let profile = ProfileService::new(&backend, "profiles", UserId::new(Uuid::new_v4()));

        assert!(matches!(
            profile.upload_profile_image(Vec::new(), "image/png").await,
            Err(ProfileError::Empty)
        ));
        assert!(matches!(
            profile.upload_profile_image(vec![1], "image/gif").await,
            Err(ProfileError::UnsupportedType(_))
        ));
        assert!(matches!(
            profile
                .upload_profile_image(vec![0; MAX_IMAGE_BYTES + 1], "image/png")
                .await,
            Err(ProfileError::TooLarge)
        ));
    }

    #[tokio::test]
    async fn test_failed_row_insert_removes_new_object() {
        let backend = InMemoryBackend::new();
        backend.fail_on(TableOp::Insert, "profileImage").await;
        let profile = ProfileService::new(&backend, "profiles", UserId::new(Uuid::new_v4()));

        let result = profile.upload_profile_image(vec![1, 2, 3], "image/png").await;

        assert!(matches!(result, Err(ProfileError::Backend(_))));
        assert!(backend.rows("profileImage").await.is_empty());
        assert!(backend.objects("profiles").await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_row_update_keeps_previous_image() {
        let backend = InMemoryBackend::new();
        let profile = ProfileService::new(&backend, "profiles", UserId::new(Uuid::new_v4()));
        let first = profile
            .upload_profile_image(vec![1], "image/png")
            .await
            .unwrap();
        let first_path = profile.object_path(&first).unwrap();

        backend.fail_on(TableOp::Update, "profileImage").await;
        let result = profile.upload_profile_image(vec![2], "image/jpeg").await;

        assert!(matches!(result, Err(ProfileError::Backend(_))));
        assert_eq!(profile.profile_image().await.unwrap(), Some(first));
        assert_eq!(backend.objects("profiles").await, vec![first_path]);
    }
}
