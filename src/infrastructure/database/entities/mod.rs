pub mod access_setting;
pub mod api_token;
pub mod device_token;
pub mod ui_restriction;
pub mod user;
