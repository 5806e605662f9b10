//! Authentication helpers used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! session identity resolution and the admin check here.

use crate::domain::{Error, User};
use crate::domain::ports::AccountService;

use super::ApiResult;
use super::session::SessionContext;

/// Resolve the session into a live account.
///
/// A missing session yields `401`; so does a session whose user has since
/// been deleted.
pub async fn require_user(
    accounts: &dyn AccountService,
    session: &SessionContext,
) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    accounts.current_user(user_id).await
}

/// Resolve the session and insist on an administrator account.
pub async fn require_admin(
    accounts: &dyn AccountService,
    session: &SessionContext,
) -> ApiResult<User> {
    let user = require_user(accounts, session).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Error::forbidden("administrator access required"))
    }
}
