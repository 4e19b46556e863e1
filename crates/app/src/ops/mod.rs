pub mod digest;
pub mod download;
pub mod init;
pub mod login;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod session;
pub mod share;
pub mod upload;
pub mod version;

pub use digest::Digest;
pub use download::Download;
pub use init::Init;
pub use login::Login;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use mv::Mv;
pub use rm::Rm;
pub use session::{Logout, Refresh, Whoami};
pub use share::Share;
pub use upload::Upload;
pub use version::Version;
