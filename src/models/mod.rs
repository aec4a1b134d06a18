//! 数据模型模块
//! 用户、活动、预约以及认证相关的请求/响应结构

pub mod auth;
pub mod event;
pub mod reservation;
pub mod user;

pub use event::{Event, EventInput, EventRequest, DATE_TIME_FORMAT};
pub use reservation::{CreateReservationRequest, Reservation};
pub use user::{NewUser, Role, User};
