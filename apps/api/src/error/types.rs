use coursehub_core::AppError;
use serde::Serialize;
use ts_rs::TS;

const RATE_LIMITED_MESSAGE: &str = "too many requests, please try again later";
const INTERNAL_MESSAGE: &str = "internal server error";

/// JSON body of every failed response: `{ "message": ... }`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

impl ErrorResponse {
    /// Body sent with 429 responses.
    pub(crate) fn rate_limited() -> Self {
        Self {
            message: RATE_LIMITED_MESSAGE.to_owned(),
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        // Internal details stay in the logs.
        let message = match error {
            AppError::Internal(_) => INTERNAL_MESSAGE.to_owned(),
            other => other.to_string(),
        };
        Self { message }
    }
}
