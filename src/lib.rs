//! Ember Kernel Core.
//!
//! Núcleo de multitarefa preemptiva do kernel: escalonador, ciclo de vida de
//! tarefas, spinlocks, desabilitação de interrupções e wait queues.
//!
//! Em bare metal (`target_os = "none"`) a crate é `no_std` e usa a HAL
//! x86_64. Em qualquer outro alvo a HAL `hosted` emula núcleos, interrupções
//! e troca de contexto sobre threads do host (é onde rodam os testes).

#![cfg_attr(target_os = "none", no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/Arc)
extern crate alloc;

// --- Infraestrutura (logging, IRQs, agregado do kernel) ---
pub mod core;

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // HAL (CPU, Contexto, Interrupções)
pub mod drivers; // Serial (sink de log)

// --- Módulos Centrais ---
pub mod klib; // Listas intrusivas, framework de testes
pub mod sync; // Spinlock, InterruptDisabler
pub mod sys; // Errno, tipos fundamentais

// --- Subsistemas ---
pub mod sched; // Scheduler, Tarefas, WaitQueue, TaskStatus

pub use crate::core::kernel::Kernel;
pub use crate::sched::{Scheduler, TaskStatus, WaitQueue};
pub use crate::sync::{with_interrupts_disabled, InterruptDisabler, RawSpinlock, Spinlock};
pub use crate::sys::{Errno, KResult};
