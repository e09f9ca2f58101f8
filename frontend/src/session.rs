//! Which jukebox chat this page belongs to.
//!
//! Pages are served at `/jukebox/web/{chat_id}`, and every request the widget
//! makes is scoped by that chat id. The id is an opaque path segment as far as
//! the client is concerned; the backend knows what it means.

use thiserror::Error;

pub struct Session {
    chat_id: String,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("page address {pathname:?} has no chat id")]
    NoChatId { pathname: String },
}

impl Session {
    /// Derive the session from `location.pathname`. The chat id is kept as
    /// the raw path segment, so splicing it back into request paths needs no
    /// re-encoding.
    pub fn from_pathname(pathname: &str) -> Result<Session, SessionError> {
        let mut segments = pathname.split('/').filter(|segment| !segment.is_empty());
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some("jukebox"), Some("web"), Some(chat_id), None) => Ok(Session {
                chat_id: chat_id.to_string(),
            }),
            _ => Err(SessionError::NoChatId {
                pathname: pathname.to_string(),
            }),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn search_path(&self) -> String {
        format!("/jukebox/web/{}/search", self.chat_id)
    }

    pub fn add_path(&self) -> String {
        format!("/jukebox/web/{}/add", self.chat_id)
    }

    /// The status endpoint lives outside the per-chat tree; the chat id goes
    /// in the query string instead.
    pub fn status_path(&self) -> &'static str {
        "/jukebox/status"
    }
}
