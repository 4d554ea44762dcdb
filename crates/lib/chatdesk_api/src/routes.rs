//! Route paths served by [`crate::router`].

pub const GET_INDEX: &str = "/";
pub const GET_CONVERSATION: &str = "/c/{id}/";
pub const REGISTER: &str = "/register/";
pub const LOGIN: &str = "/login/";
pub const POST_LOGOUT: &str = "/logout/";
pub const GET_CHAT_JS: &str = "/static/chat.js";

pub const POST_API_CONVERSATIONS_NEW: &str = "/api/conversations/new/";
pub const DELETE_API_CONVERSATION: &str = "/api/conversations/{id}/delete/";
pub const PATCH_API_CONVERSATION_RENAME: &str = "/api/conversations/{id}/rename/";
pub const GET_API_CONVERSATION_MESSAGES: &str = "/api/conversations/{id}/messages/";
pub const POST_API_SEND: &str = "/api/send/";
