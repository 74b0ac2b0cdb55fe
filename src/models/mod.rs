pub mod chat;
pub mod contact;
pub mod webhook;
