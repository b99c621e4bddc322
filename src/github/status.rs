use super::transport::ApiResponse;
use crate::error::ManagerError;

/// Human-readable summary of a response status.
pub fn describe(response: &ApiResponse) -> String {
    let status = response.status;
    match status {
        200..=299 => format!("{status} status OK."),
        401 => format!("{status} status: Unauthorized, check login information."),
        403 => format!(
            "{status} status: Request refused, possibly by the API rate limit. Wait a while before trying again."
        ),
        404 => format!("{status} status: Repository not found, check login information."),
        _ => format!("{status} status: An error occurred."),
    }
}

/// `Ok(())` for 2xx, otherwise an `Http` error carrying the description.
pub fn check(response: &ApiResponse) -> Result<(), ManagerError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ManagerError::Http {
            status: response.status,
            reason: describe(response),
        })
    }
}
