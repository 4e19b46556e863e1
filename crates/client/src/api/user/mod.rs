mod login;
mod logout;
mod profile;
mod refresh;

pub use login::{LoginRequest, LoginResponse};
pub use logout::{LogoutRequest, LogoutResponse};
pub use profile::{ProfileRequest, ProfileResponse, UserInfo};
pub use refresh::{RefreshTokenRequest, RefreshTokenResponse};
