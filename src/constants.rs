//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Identifier of the synthetic welcome tab.
pub const WELCOME_TAB_ID: &str = "welcome";

/// Title of the synthetic welcome tab.
pub const WELCOME_TAB_TITLE: &str = "Welcome";

/// Name given to a freshly created draft request.
pub const NEW_REQUEST_NAME: &str = "New Request";

/// Name given to a freshly created collection.
pub const NEW_COLLECTION_NAME: &str = "New Collection";

/// Name given to requests imported from a cURL command.
pub const CURL_IMPORT_NAME: &str = "Imported cURL";

/// Directory under the home directory holding the slot store.
pub const CONFIG_DIR: &str = ".httpdeck";

/// File name of the slot store inside the config directory.
pub const STORE_FILE: &str = "store.json";
