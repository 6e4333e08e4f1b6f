//! Modelo de tarefa: TCB, estados, contabilidade, status de término e arena.

pub mod accounting;
pub mod arena;
pub mod entity;
pub mod state;
pub mod status;

pub use accounting::Accounting;
pub use arena::TaskArena;
pub use entity::{Task, TaskFlags, TaskInfo};
pub use state::TaskState;
pub use status::TaskStatus;
