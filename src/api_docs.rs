use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::equipment::list_stock,
        api::ledger::borrow,
        api::ledger::return_item,
        api::ledger::record_stat,
        api::reports::pending_returns,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "stockroom", description = "Equipment ledger API")
    )
)]
pub struct ApiDoc;
