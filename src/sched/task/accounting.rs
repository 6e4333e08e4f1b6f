//! Contabilidade de Recursos (Accounting)
//!
//! Tempo de CPU em ticks do timer do núcleo, trocas de contexto e quantum.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accounting {
    /// Ticks de timer recebidos enquanto a tarefa executava
    pub cpu_ticks: u64,

    /// Tick do núcleo na última vez que a tarefa ganhou a CPU
    pub last_start_tick: u64,

    /// Quantas vezes foi despachada
    pub dispatches: u64,

    /// Trocas voluntárias (yield, bloqueio)
    pub voluntary_switches: u64,

    /// Trocas involuntárias (quantum expirado)
    pub involuntary_switches: u64,

    /// Ticks restantes nesta fatia de tempo
    pub quantum_left: u64,
}

impl Accounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra o início da execução (tarefa ganhou a CPU)
    pub fn start_exec(&mut self, now: u64, quantum: u64) {
        self.last_start_tick = now;
        self.dispatches += 1;
        self.quantum_left = quantum;
    }

    /// Um tick de timer com a tarefa em execução. Retorna `true` quando o
    /// quantum acabou.
    pub fn tick(&mut self) -> bool {
        self.cpu_ticks += 1;
        self.quantum_left = self.quantum_left.saturating_sub(1);
        self.quantum_left == 0
    }

    /// Incrementa contadores de troca de contexto
    pub fn account_switch(&mut self, voluntary: bool) {
        if voluntary {
            self.voluntary_switches += 1;
        } else {
            self.involuntary_switches += 1;
        }
    }
}
