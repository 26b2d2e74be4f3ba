// HTTP status codes

/// The status codes used by the meeple API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    // 2xx Success
    Ok = 200,
    Created = 201,
    NoContent = 204,

    // 4xx Client Errors
    BadRequest = 400,
    NotFound = 404,
    UnprocessableEntity = 422,

    // 5xx Server Errors
    InternalServerError = 500,
}

impl HttpStatus {
    /// Numeric status code.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a status by its numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            201 => Some(Self::Created),
            204 => Some(Self::NoContent),
            400 => Some(Self::BadRequest),
            404 => Some(Self::NotFound),
            422 => Some(Self::UnprocessableEntity),
            500 => Some(Self::InternalServerError),
            _ => None,
        }
    }

    /// Canonical reason phrase.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::UnprocessableEntity => "Unprocessable Entity",
            Self::InternalServerError => "Internal Server Error",
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.code())
    }
}
