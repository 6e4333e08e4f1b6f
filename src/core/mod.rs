//! Core Module
//!
//! Infraestrutura em volta do scheduler: logging, parâmetros de boot,
//! roteamento de IRQs e o agregado `Kernel`.

pub mod boot;
pub mod irq;
pub mod kernel;
pub mod logging;
