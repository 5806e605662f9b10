//! Administrator overview handlers.

use actix_web::{get, web};

use crate::domain::{Error, Roster};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Every event with its roster, ordered by event id.
#[utoipa::path(
    get,
    path = "/api/v1/admin/rosters",
    responses(
        (status = 200, description = "All rosters", body = [Roster]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listAllRosters"
)]
#[get("/admin/rosters")]
pub async fn all_rosters(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Roster>>> {
    require_admin(state.accounts.as_ref(), &session).await?;
    Ok(web::Json(state.rosters.list_all_rosters().await?))
}
