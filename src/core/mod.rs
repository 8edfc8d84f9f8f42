//! Core types shared across the notification channel: configuration,
//! notification models, and the permission/subject boundaries supplied by
//! the host application.

pub mod config;
pub mod models;
pub mod permission;
pub mod subjects;
