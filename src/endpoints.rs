// Backend endpoint paths
// Shared by the gateway, the token store and the session layer

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_ME: &str = "/auth/me";

/// Join a base URL and an endpoint path without doubling the separator
pub fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
