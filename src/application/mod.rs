pub mod session_controller;
pub mod session_worker;

pub use session_controller::{SessionController, SessionStream, DEFAULT_GRACE_PERIOD};
pub use session_worker::{spawn_one_shot, spawn_session, SessionEvent, SessionWorker};
