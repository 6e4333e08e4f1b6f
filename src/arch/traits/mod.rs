//! Traits do Hardware Abstraction Layer (HAL).
//! Interfaces públicas que o núcleo usa para falar com o hardware.

pub mod context;
pub mod cpu;

// Re-exportar para facilitar uso: `use crate::arch::traits::CpuOps;`
pub use context::{ContextOps, TaskStart};
pub use cpu::CpuOps;
