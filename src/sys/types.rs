//! Tipos fundamentais do sistema

use core::fmt;

/// Thread ID
///
/// Handle estável para uma entrada da arena de tarefas: índice do slot mais a
/// geração do slot no momento da criação. Um `Tid` de uma tarefa já colhida
/// (reaped) nunca casa com o ocupante seguinte do mesmo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tid {
    index: u32,
    generation: u32,
}

impl Tid {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> usize {
        self.index as usize
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Valor compacto para os macros de log (que imprimem em hex).
    pub const fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.index, self.generation)
    }
}

/// Identificador de núcleo lógico (0 = BSP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CoreId(pub u32);

impl CoreId {
    pub const BSP: CoreId = CoreId(0);

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}
