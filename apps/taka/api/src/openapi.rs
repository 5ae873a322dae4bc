use utoipa::OpenApi;

/// Combined API documentation, paths prefixed with `/api`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taka API",
        description = "Accounts and administrative locations for municipal waste collection"
    ),
    nest(
        (path = "/api/accounts", api = domain_accounts::ApiDoc),
        (path = "/api/locations", api = domain_locations::ApiDoc)
    )
)]
pub struct ApiDoc;
