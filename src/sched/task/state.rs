//! Estados de task

/// Estado de uma task
///
/// ```text
///   create ──► Runnable ──dispatch──► Running ──exit──► Exited
///                 ▲                     │
///                 └──yield/preempção────┤
///                 ▲                     ▼
///                 └──────wakeup─────── Blocked
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Pronta para executar (na fila de execução de um núcleo)
    Runnable,
    /// Executando em algum núcleo
    Running,
    /// Bloqueada em uma wait queue
    Blocked,
    /// Terminada, esperando `reap`
    Exited,
}

impl TaskState {
    /// Verifica se pode ser escalonada
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Runnable | Self::Running)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Runnable => "runnable",
            Self::Running => "running",
            Self::Blocked => "blocked",
            Self::Exited => "exited",
        }
    }
}
