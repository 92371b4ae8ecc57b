//! Application constants
//!
//! Backend endpoint paths and token store keys shared by every crate.

// Backend
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 15;

// Token store keys (same names the web client kept in localStorage)
pub const ACCESS_TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

// Token store defaults
pub const DEFAULT_TOKEN_FILE: &str = "ajok-session.json";
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "ajok.session";

// Auth endpoints
pub const TOKEN_PATH: &str = "/users/token/";
pub const TOKEN_REFRESH_PATH: &str = "/users/token/refresh/";
pub const REGISTER_PATH: &str = "/users/register/";
pub const ME_PATH: &str = "/users/me/";
pub const UPDATE_PROFILE_PATH: &str = "/users/update_profile/";
pub const CHANGE_PASSWORD_PATH: &str = "/users/change_password/";

// Property endpoints
pub const LISTINGS_PATH: &str = "/properties/listings/";
pub const MY_LISTINGS_PATH: &str = "/properties/listings/my_properties/";
pub const PROPERTY_TYPES_PATH: &str = "/properties/types/";
pub const FAVORITES_PATH: &str = "/properties/favorites/";
pub const RECOMMENDED_FAVORITES_PATH: &str = "/properties/favorites/recommended/";
pub const INQUIRIES_PATH: &str = "/properties/inquiries/";

// Navigation targets after login, by role
pub const AGENT_HOME_PATH: &str = "/dashboard";
pub const TENANT_HOME_PATH: &str = "/my-rentals";
pub const LOGIN_PATH: &str = "/login";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info";
