//! HTTP 处理器模块

pub mod auth;
pub mod event;
pub mod health;
pub mod reservation;
