//! # Standard Error Codes (Errno)
//!
//! Define os códigos de erro retornados pelo núcleo.
//! Baseado no padrão POSIX para compatibilidade com ferramentas existentes.
//!
//! ## Política de Propagação
//! - Falhas recuperáveis sobem como `KResult<T>` explícito (sem unwinding).
//! - Violações de invariantes (enqueue duplo, unlock de lock livre, bloquear
//!   com interrupções desabilitadas) são bugs de lógica e terminam em `panic!`.
//! - Não há retry nesta camada: quem recebe `EINTR` decide se repete a espera.

use core::fmt;

/// Resultado padrão das operações do núcleo.
pub type KResult<T> = Result<T, Errno>;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    EPERM = 1,   // Operation not permitted
    ESRCH = 3,   // No such process
    EINTR = 4,   // Interrupted system call
    EAGAIN = 11, // Try again
    ENOMEM = 12, // Out of memory
    EBUSY = 16,  // Device or resource busy
    EEXIST = 17, // File exists
    ENODEV = 19, // No such device
    EINVAL = 22, // Invalid argument
    ENOSPC = 28, // No space left on device
    ENOSYS = 38, // Function not implemented
}

impl Errno {
    /// Espera bloqueante cancelada antes do predicado ser satisfeito.
    pub const INTERRUPTED: Errno = Errno::EINTR;

    pub fn as_usize(self) -> usize {
        self as usize
    }

    pub fn as_isize(self) -> isize {
        -(self as i32) as isize
    }

    /// Nome simbólico (para logs).
    pub const fn name(self) -> &'static str {
        match self {
            Errno::EPERM => "EPERM",
            Errno::ESRCH => "ESRCH",
            Errno::EINTR => "EINTR",
            Errno::EAGAIN => "EAGAIN",
            Errno::ENOMEM => "ENOMEM",
            Errno::EBUSY => "EBUSY",
            Errno::EEXIST => "EEXIST",
            Errno::ENODEV => "ENODEV",
            Errno::EINVAL => "EINVAL",
            Errno::ENOSPC => "ENOSPC",
            Errno::ENOSYS => "ENOSYS",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), *self as i32)
    }
}
