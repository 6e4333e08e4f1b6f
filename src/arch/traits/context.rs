//! Interface de troca de contexto.
//!
//! O escalonador é agnóstico de arquitetura: tudo o que ele sabe fazer com o
//! estado salvo de uma tarefa é "salvar o contexto atual no slot X e restaurar
//! o contexto do slot Y". Cada arquitetura implementa isso uma única vez.

use crate::sys::{CoreId, KResult};

/// Ponto de entrada de uma tarefa nova: `func(arg)`, que nunca retorna.
///
/// ABI `C-unwind`: na plataforma hospedada a thread de uma tarefa encerrada
/// sai de `func` desenrolando a pilha.
#[derive(Debug, Clone, Copy)]
pub struct TaskStart {
    pub func: extern "C-unwind" fn(usize) -> !,
    pub arg: usize,
}

pub trait ContextOps: Send + Sized {
    /// Slot vazio, preenchido pelo primeiro `switch` que salvar nele.
    /// Usado para o contexto de boot/idle de cada núcleo.
    fn empty() -> Self;

    /// Contexto inicial de uma tarefa nova, com pilha própria, que começa
    /// executando `start.func(start.arg)` com interrupções desabilitadas.
    fn prepare(start: TaskStart) -> KResult<Self>;

    /// Salva o contexto corrente em `prev` e restaura `next` no núcleo `core`.
    /// Retorna quando alguém restaurar `prev` novamente.
    ///
    /// # Safety
    /// - Interrupções desabilitadas.
    /// - `prev` e `next` válidos e estáveis na memória até a retomada.
    unsafe fn switch(prev: *mut Self, next: *const Self, core: CoreId);

    /// Restaura `next` sem salvar o contexto corrente (tarefa que terminou).
    ///
    /// # Safety
    /// Mesmas condições de `switch`; o contexto corrente é abandonado.
    unsafe fn jump(next: *const Self, core: CoreId) -> !;
}
