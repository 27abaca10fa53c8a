/// Namespace path the realtime chat connection is scoped to
pub const CHAT_NAMESPACE: &str = "/chat";

/// Application name
pub const APP_NAME: &str = "Parley";

/// Maximum outgoing text message size in bytes (256 KiB)
pub const MAX_MESSAGE_SIZE: usize = 262_144;

/// Maximum outgoing file payload size in bytes (50 MiB)
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Capacity of the command channel into the connection task
pub const CONN_COMMAND_BUFFER: usize = 256;

/// Capacity of the notification channel out of the connection task
pub const CONN_NOTIFICATION_BUFFER: usize = 256;

/// Capacity of the session's internal completion-event queue
pub const SESSION_EVENT_BUFFER: usize = 256;

/// Default REST API base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Default realtime socket base URL
pub const DEFAULT_SOCKET_URL: &str = "ws://127.0.0.1:3000";
