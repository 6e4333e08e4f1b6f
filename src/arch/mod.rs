//! # Hardware Abstraction Layer (HAL)
//!
//! O módulo `arch` é a **única** ponte entre o núcleo (lógica agnóstica) e o
//! hardware real. Controle de interrupções, halt, identificação de núcleo e
//! troca de contexto passam por aqui.
//!
//! ## Seleção de Plataforma
//! - `target_os = "none"` + `x86_64`: implementação bare metal (`x86_64/`).
//! - Qualquer outro alvo: `hosted/`, que emula núcleos, flag de interrupção e
//!   troca de contexto sobre threads do host. É a plataforma dos testes.
//!
//! O resto do kernel usa apenas `arch::Cpu`, `arch::Context` e
//! `arch::TrapFrame`, nunca o módulo da plataforma diretamente.

pub mod traits;

// Seleção de Arquitetura: x86_64 bare metal
#[cfg(all(target_os = "none", target_arch = "x86_64"))]
pub mod x86_64;

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
pub use self::x86_64 as platform;

// Plataforma hospedada (testes e simulação)
#[cfg(not(target_os = "none"))]
pub mod hosted;

#[cfg(not(target_os = "none"))]
pub use self::hosted as platform;

#[cfg(all(target_os = "none", not(target_arch = "x86_64")))]
compile_error!("Ember: arquitetura bare metal sem HAL implementada");

// Re-exports globais para o kernel usar
pub use platform::{Context, Cpu, TrapFrame};
pub use traits::*;
