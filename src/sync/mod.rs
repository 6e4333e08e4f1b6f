//! # Synchronization Primitives
//!
//! ```text
//! InterruptDisabler → Seção que não pode ser interrompida no núcleo atual
//! Spinlock          → Seções críticas curtas entre núcleos (não pode dormir)
//! WaitQueue         → Espera por condição (pode dormir), ver `sched::sync`
//! ```
//!
//! ## Regras
//!
//! - Spinlocks desabilitam interrupções enquanto seguros.
//! - Nunca dormir segurando spinlock: `WaitQueue::wait` verifica.
//! - Ordem de lock: estado da wait queue → scheduler. Nunca o inverso.

pub mod interrupt;
pub mod spinlock;

pub use interrupt::{with_interrupts_disabled, InterruptDisabler};
pub use spinlock::{RawSpinlock, Spinlock, SpinlockGuard};
