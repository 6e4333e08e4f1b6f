//! # Plataforma Hospedada
//!
//! Emula a HAL sobre threads do host para que o escalonador rode de verdade
//! fora do bare metal (é onde rodam os testes).
//!
//! - Cada tarefa é uma thread do host; só a thread cujo contexto foi
//!   restaurado anda, as demais ficam presas no seu `Gate`.
//! - A flag de interrupção é um `Cell<bool>` por thread.
//! - IRQs simuladas (`raise_irq`) rodam na hora se as interrupções estiverem
//!   habilitadas, ou ficam pendentes até o próximo `enable_interrupts`.

pub mod context;
pub mod cpu;
pub mod irq;

pub use context::{Context, TrapFrame};
pub use cpu::{bind_core, pending_irqs, raise_irq, Cpu};
pub use irq::SimulatedController;
