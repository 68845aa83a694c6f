// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Describe an access service response status
pub fn describe_status(status: u16) -> &'static str {
    match status {
        204 => "ok",
        400 => "rejected, card unknown, exhausted, or already enrolled",
        401 => "unauthorised, check service credentials",
        404 => "not found, check service base URL",
        500..=599 => "service error",
        _ => "unexpected response",
    }
}
