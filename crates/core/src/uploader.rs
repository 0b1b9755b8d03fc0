//! Single-asset submission to the remote service.

use crate::models::TrackedPhoto;
use providers::{AssetUpload, ProviderError, RemoteLibrary};
use tracing::info;

/// Submits one local asset and maps the receipt into a tracked photo.
///
/// Deliberately does not insert into the collection store; the batch
/// orchestrator does that, so every store mutation happens at one call site.
pub async fn submit(
    remote: &dyn RemoteLibrary,
    user_id: &str,
    asset: &AssetUpload,
) -> Result<TrackedPhoto, ProviderError> {
    let receipt = remote.upload(user_id, asset).await?;
    let photo = TrackedPhoto::from_receipt(receipt);
    info!("uploaded {} as photo {}", asset.file_name, photo.photo_id);
    Ok(photo)
}
