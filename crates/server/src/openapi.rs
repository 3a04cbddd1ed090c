use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct BookingRequest {
    pub service_id: Uuid,
    /// RFC 3339 timestamp
    pub service_date: String,
    pub number_of_people: i32,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(ToSchema)]
pub struct ContactRequestDoc {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::catalog::list_services,
        crate::routes::catalog::get_service,
        crate::routes::blogs::list_blogs,
        crate::routes::bookings::create_booking,
        crate::routes::contact::submit,
        crate::routes::admin::dashboard,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            BookingRequest,
            ContactRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services"),
        (name = "blogs"),
        (name = "bookings"),
        (name = "contact"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
