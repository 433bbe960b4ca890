/// Application name
pub const APP_NAME: &str = "atlas";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension a module package manifest must carry to be recognized
pub const PACKAGE_EXTENSION: &str = "module";

/// Default module packages directory, under the host data root
pub const MODULES_DIR: &str = "module/modules";

/// Default module data directory, under the host data root
pub const DATA_DIR: &str = "module/data";

/// Default configuration directory, under the host data root
pub const CONFIGS_DIR: &str = "configs";
