//! Chat persistence abstractions and the chat service.
//!
//! `ChatRepository` is implemented by the infrastructure layer; `ChatService`
//! defines the create/append/edit/delete/list protocol on top of it.

pub mod repository;
pub mod service;
pub mod title;
