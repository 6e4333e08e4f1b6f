//! Configuração do Scheduler

use crate::core::boot::CommandLine;
use crate::sys::{Errno, KResult};

/// Número máximo de núcleos suportados
pub const MAX_CPUS: usize = 64;

/// Tamanho padrão da Stack de Kernel (em bytes)
pub const KERNEL_STACK_SIZE: usize = 65536; // 64KB

/// Quantum padrão (Timeslice) em ticks do timer
pub const DEFAULT_QUANTUM: u64 = 10;

/// Quantum máximo aceito (ticks)
pub const MAX_QUANTUM: u64 = 1_000_000;

/// Frequência padrão do timer (ticks por segundo)
pub const DEFAULT_TIMER_HZ: u32 = 100;

/// Frequência máxima aceita para o timer
pub const MAX_TIMER_HZ: u32 = 10_000;

/// Tamanho máximo do nome de uma tarefa (bytes)
pub const TASK_NAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedConfig {
    /// Núcleos que rodarão o scheduler (cada um chama `Scheduler::start`).
    pub cores: usize,
    /// Ticks de timer que uma tarefa roda antes de ser preemptada.
    pub quantum_ticks: u64,
    /// Frequência do timer, para converter ticks em tempo.
    pub timer_hz: u32,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            cores: 1,
            quantum_ticks: DEFAULT_QUANTUM,
            timer_hz: DEFAULT_TIMER_HZ,
        }
    }
}

impl SchedConfig {
    pub fn validate(&self) -> KResult<()> {
        if self.cores == 0 || self.cores > MAX_CPUS {
            return Err(Errno::EINVAL);
        }
        if self.cores > 1 && !cfg!(feature = "smp") {
            crate::kerror!("(Sched) Mais de um núcleo sem a feature smp:", self.cores);
            return Err(Errno::EINVAL);
        }
        if self.quantum_ticks == 0 || self.quantum_ticks > MAX_QUANTUM {
            return Err(Errno::EINVAL);
        }
        if self.timer_hz == 0 || self.timer_hz > MAX_TIMER_HZ {
            return Err(Errno::EINVAL);
        }
        Ok(())
    }

    /// Lê `sched.quantum`, `sched.hz` e `smp.cores`; o que faltar fica no padrão.
    pub fn from_cmdline(cmdline: &CommandLine) -> KResult<Self> {
        let mut config = Self::default();

        if let Some(q) = cmdline.get_u64("sched.quantum")? {
            config.quantum_ticks = q;
        }
        if let Some(hz) = cmdline.get_u64("sched.hz")? {
            config.timer_hz = u32::try_from(hz).map_err(|_| Errno::EINVAL)?;
        }
        if let Some(n) = cmdline.get_u64("smp.cores")? {
            config.cores = usize::try_from(n).map_err(|_| Errno::EINVAL)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Duração do quantum em milissegundos.
    pub fn quantum_millis(&self) -> u64 {
        // Campos são públicos: a config pode não ter passado por `validate`
        self.quantum_ticks.saturating_mul(1000) / u64::from(self.timer_hz.max(1))
    }
}
