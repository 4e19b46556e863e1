use std::fmt;

use serde::Serialize;

/// Facts about this binary, baked in by the build script
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub package: &'static str,
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub build_target: &'static str,
    pub rust_version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        package: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        repo_version: env!("REPO_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        build_target: env!("BUILD_TARGET"),
        rust_version: env!("RUST_VERSION"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})\nprofile: {}\nbuilt: {}\ntarget: {}\nrustc: {}",
            self.package,
            self.version,
            self.repo_version,
            self.build_profile,
            self.build_timestamp,
            self.build_target,
            self.rust_version
        )
    }
}

/// Log what is running, once, at startup
pub fn report_build_info() {
    let build = build_info();
    tracing::debug!(
        version = build.version,
        repo_version = build.repo_version,
        build_profile = build.build_profile,
        "drive starting up"
    );
}
