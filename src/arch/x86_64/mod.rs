//! # x86_64 (bare metal)
//!
//! Implementação da HAL para long mode, Ring 0.
//!
//! - `cpu`: controle de interrupções, HLT/PAUSE e identificação do núcleo.
//! - `context`: troca de contexto em Assembly (callee-saved + RSP + RIP).
//! - `interrupts`: stubs de IRQ (vetores 32..48) que entram no kernel.
//! - `apic`: I/O APIC (roteamento) e EOI do Local APIC.
//!
//! GDT/IDT e o mapeamento MMIO dos APICs ficam com o código de boot que
//! embute esta crate; aqui só exportamos os endereços dos stubs.

pub mod apic;
pub mod context;
pub mod cpu;
pub mod interrupts;

pub use context::{Context, TrapFrame};
pub use cpu::Cpu;
