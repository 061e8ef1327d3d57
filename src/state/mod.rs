/// State management module
///
/// This module handles all application state, including:
/// - The uploader state machine (uploader.rs)
/// - Transient user notifications (notifications.rs)
pub mod notifications;
pub mod uploader;
