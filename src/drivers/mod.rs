//! # Drivers
//!
//! Só o que o núcleo precisa para diagnóstico: a porta serial, sink dos
//! macros de log. Controladores de interrupção vivem na HAL (`arch`).

pub mod serial;
