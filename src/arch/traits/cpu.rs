//! Interface Abstrata de CPU (HAL).
//! Define as operações que qualquer arquitetura deve implementar.

use crate::sys::CoreId;

pub trait CpuOps {
    /// ID do núcleo que executa o chamador.
    fn current_id() -> CoreId;

    /// Para a execução da CPU até a próxima interrupção (instrução HLT).
    fn halt();

    /// Habilita interrupções e para até a próxima, sem janela entre as duas
    /// operações (em x86 `sti; hlt` é atômico por causa do interrupt shadow).
    fn enable_and_halt();

    /// Dica para a CPU de que estamos em um spin loop (PAUSE).
    fn relax();

    /// Desabilita interrupções no núcleo atual (CLI).
    ///
    /// # Safety
    /// Requer privilégio de kernel. Quem desabilita é responsável por restaurar.
    unsafe fn disable_interrupts();

    /// Habilita interrupções no núcleo atual (STI).
    ///
    /// # Safety
    /// Pode causar preempção imediata.
    unsafe fn enable_interrupts();

    /// Verifica se as interrupções estão habilitadas no núcleo atual.
    fn are_interrupts_enabled() -> bool;

    /// Entra em loop infinito de halt com interrupções desabilitadas.
    /// Usado em pânicos irrecuperáveis.
    fn hang() -> ! {
        unsafe { Self::disable_interrupts() };
        loop {
            Self::halt();
        }
    }
}
