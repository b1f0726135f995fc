//! Backend credentials for an in-flight request
//!
//! Feed operations run with whatever backend session is current and, when the
//! backend rejects its access token, ask for it to be renewed once before
//! giving up.

use std::future::Future;

use async_trait::async_trait;

use crate::domain::entities::Session;
use crate::error::{AppError, BackendError};

#[async_trait]
pub trait SessionContext: Send + Sync {
    /// The backend session to use right now
    fn current(&self) -> Session;

    /// Replace `rejected` with a fresh session.
    ///
    /// Returns `false` when the session cannot be renewed; it is then revoked.
    async fn renew(&self, rejected: &Session) -> bool;
}

/// Run `op` with the current session, renewing and retrying once if the
/// backend answers 401
pub async fn with_renewal<T, F, Fut>(session: &dyn SessionContext, op: F) -> Result<T, AppError>
where
    F: Fn(Session) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let current = session.current();
    match op(current.clone()).await {
        Err(e @ AppError::Backend(BackendError::Unauthorized(_))) => {
            if session.renew(&current).await {
                tracing::debug!(user_id = %current.user_id(), "Retrying with renewed session");
                op(session.current()).await
            } else {
                Err(e)
            }
        }
        other => other,
    }
}
