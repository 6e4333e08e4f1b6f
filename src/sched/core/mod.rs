//! Núcleo do scheduler: estado por núcleo, fila de execução, despacho.

pub mod cpu;
pub(crate) mod entry;
pub mod runqueue;
pub mod scheduler;

pub use cpu::CoreStats;
pub use runqueue::RunQueue;
pub use scheduler::Scheduler;
