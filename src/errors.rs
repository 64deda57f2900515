use rocket::{
    catch, catchers,
    response::{self, Responder},
    serde::json::Json,
    Catcher, Request,
};

/// Errors surfaced to API callers. Each variant maps to one HTTP status and
/// carries a human-readable detail.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Authentication error: {0}")]
    Authentication(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        ApiError::BadRequest(detail.into())
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        ApiError::Authentication(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        ApiError::NotFound(detail.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }

    /// HTTP status code of this error
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Authentication(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    /// The detail message without the category prefix
    pub fn detail(&self) -> &str {
        match self {
            ApiError::BadRequest(detail)
            | ApiError::Authentication(detail)
            | ApiError::NotFound(detail)
            | ApiError::Internal(detail) => detail,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct Message {
    message: String,
}
impl Message {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Responder)]
enum ApiErrorResponse {
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<Message>),
    #[response(status = 401, content_type = "json")]
    Unauthorized(Json<Message>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<Message>),
    #[response(status = 500, content_type = "json")]
    Server(Json<Message>),
}

/// API error response handling
impl<'r, 'o: 'r> response::Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        rocket::info!("API error: {:?}", self);
        let message = Json(Message::new(self.detail()));
        match self {
            ApiError::BadRequest(_) => ApiErrorResponse::BadRequest(message).respond_to(req),
            ApiError::Authentication(_) => {
                ApiErrorResponse::Unauthorized(message).respond_to(req)
            }
            ApiError::NotFound(_) => ApiErrorResponse::NotFound(message).respond_to(req),
            ApiError::Internal(_) => ApiErrorResponse::Server(message).respond_to(req),
        }
    }
}

/// Default JSON catchers for request errors.
pub fn get_catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        unauthorized,
        unprocessable_entity,
        not_found,
        server_error
    ]
}
#[catch(400)]
fn bad_request(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::BadRequest(Json(Message::new("Bad request")))
}
#[catch(401)]
fn unauthorized(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::Unauthorized(Json(Message::new("Unauthorized!")))
}
#[catch(404)]
fn not_found(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::NotFound(Json(Message::new("Not found!")))
}
#[catch(422)]
fn unprocessable_entity(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::BadRequest(Json(Message::new("Incorrectly formatted")))
}
#[catch(500)]
fn server_error(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::Server(Json(Message::new("Server error!")))
}
