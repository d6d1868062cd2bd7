use crate::domain::error::CollaboratorError;
use std::future::Future;
use std::time::Duration;

/// Bounds a collaborator call; an elapsed deadline becomes `Timeout`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout(limit)),
    }
}
