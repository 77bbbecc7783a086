//! Well-known constants and path utilities for gridboot.
//!
//! This module centralizes the default session name, the default priority
//! sentinel, the engine property namespace and the configuration file
//! locations used by discovery.

use std::path::{Path, PathBuf};

/// Name given to any session declared without an explicit name.
pub const DEFAULT_SESSION_NAME: &str = "default";

/// Priority assigned to sessions declared without one.
///
/// Sessions carrying this sentinel start after every explicitly prioritized
/// session and keep their declaration order among themselves.
pub const DEFAULT_PRIORITY: i32 = i32::MIN;

/// Application directory name (hidden directory like .git, .vscode)
pub const GRIDBOOT_DIR_NAME: &str = ".gridboot";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "gridboot.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "GRIDBOOT_CONFIG";

/// Engine property keys
pub mod properties {
    /// Namespace every property handed to the engine lives under.
    pub const NAMESPACE: &str = "engine.properties.";

    /// Logging destination
    pub const LOG_DESTINATION: &str = "engine.log";

    /// Logging severity level
    pub const LOG_LEVEL: &str = "engine.log.level";

    /// Logger name within the destination logging system
    pub const LOG_LOGGER_NAME: &str = "engine.log.logger";

    /// Log message format
    pub const LOG_MESSAGE_FORMAT: &str = "engine.log.format";

    /// Logger character limit
    pub const LOG_LIMIT: &str = "engine.log.limit";

    /// Native property naming the cluster
    pub const CLUSTER_NAME: &str = "engine.cluster";

    /// Cluster name used when none is configured
    pub const DEFAULT_CLUSTER_NAME: &str = "local";

    /// Build the namespaced form of a native engine key
    pub fn namespaced(key: &str) -> String {
        format!("{}{}", NAMESPACE, key)
    }
}

/// Build the application directory path in a base directory
pub fn gridboot_dir_path(base: &Path) -> PathBuf {
    base.join(GRIDBOOT_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    gridboot_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in the application directory of the current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    gridboot_dir_path(current_dir).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let home_dir = Path::new("/home/user");
        let current_dir = Path::new("/current/project");

        assert_eq!(
            user_config_file_path(home_dir),
            Path::new("/home/user/.gridboot/config.toml")
        );

        assert_eq!(
            local_config_file_path(current_dir),
            Path::new("/current/project/.gridboot/config.toml")
        );
    }

    #[test]
    fn test_namespaced_keys() {
        assert_eq!(
            properties::namespaced(properties::LOG_LEVEL),
            "engine.properties.engine.log.level"
        );
    }

    #[test]
    fn test_default_priority_is_not_zero() {
        assert_ne!(DEFAULT_PRIORITY, 0);
    }
}
