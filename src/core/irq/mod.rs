//! # Roteamento de IRQs
//!
//! Numeração global de interrupções (GSI) sobre vários controladores.
//!
//! - Cada `IrqController` registrado recebe uma faixa contígua de números
//!   globais: a próxima livre, ou uma base fixa vinda do firmware (GSI base
//!   do I/O APIC na MADT).
//! - Linhas ISA (0..16) são identidade, a menos que um override do firmware
//!   diga o contrário.
//! - O vetor de CPU de uma IRQ global é `IRQ_VECTOR_BASE + gsi`.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::sync::Spinlock;
use crate::sys::{CoreId, Errno, KResult};

/// Primeiro vetor de CPU usado para IRQs externas (0..32 são exceções).
pub const IRQ_VECTOR_BASE: u8 = 32;

/// Linhas ISA legadas.
pub const ISA_IRQ_COUNT: u8 = 16;

/// Número global de interrupção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalIrq(pub u32);

impl fmt::Display for GlobalIrq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gsi{}", self.0)
    }
}

/// Polaridade/gatilho de uma linha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    #[default]
    EdgeHigh,
    EdgeLow,
    LevelHigh,
    LevelLow,
}

/// Chip que entrega interrupções (I/O APIC, controlador simulado, ...).
/// `line` é sempre local ao chip.
pub trait IrqController: Send + Sync {
    fn name(&self) -> &'static str;
    fn line_count(&self) -> u32;
    fn route(&self, line: u32, vector: u8, dest: CoreId, trigger: TriggerMode);
    fn enable(&self, line: u32);
    fn disable(&self, line: u32);
    fn end_of_interrupt(&self, line: u32);
}

/// Handler de dispositivo. Roda em contexto de interrupção: não pode dormir.
pub type IrqHandler = Arc<dyn Fn(GlobalIrq) + Send + Sync>;

/// Faixa de números globais atribuída a um controlador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqRange {
    pub base: GlobalIrq,
    pub count: u32,
}

impl IrqRange {
    pub fn contains(&self, gsi: GlobalIrq) -> bool {
        gsi.0 >= self.base.0 && gsi.0 - self.base.0 < self.count
    }

    fn overlaps(&self, other: &IrqRange) -> bool {
        self.base.0 < other.base.0 + other.count && other.base.0 < self.base.0 + self.count
    }
}

struct ControllerSlot {
    range: IrqRange,
    chip: Arc<dyn IrqController>,
}

#[derive(Debug, Clone, Copy)]
struct IsaOverride {
    gsi: GlobalIrq,
    trigger: TriggerMode,
}

#[derive(Default)]
struct RegistryState {
    controllers: Vec<ControllerSlot>,
    isa_overrides: [Option<IsaOverride>; ISA_IRQ_COUNT as usize],
    handlers: BTreeMap<GlobalIrq, IrqHandler>,
    next_free: u32,
    spurious: u64,
}

pub struct IrqRegistry {
    inner: Spinlock<RegistryState>,
}

impl IrqRegistry {
    pub fn new() -> Self {
        Self {
            inner: Spinlock::new(RegistryState::default()),
        }
    }

    /// Registra um controlador na próxima faixa livre.
    pub fn register(&self, chip: Arc<dyn IrqController>) -> KResult<IrqRange> {
        let base = self.inner.lock().next_free;
        self.register_at(chip, GlobalIrq(base))
    }

    /// Registra um controlador com base fixa. `EEXIST` se a faixa colide.
    pub fn register_at(&self, chip: Arc<dyn IrqController>, base: GlobalIrq) -> KResult<IrqRange> {
        let count = chip.line_count();
        if count == 0 {
            return Err(Errno::EINVAL);
        }
        let end = base.0.checked_add(count).ok_or(Errno::EINVAL)?;
        if end > 256 - IRQ_VECTOR_BASE as u32 {
            // Sem vetor de CPU para a faixa inteira
            return Err(Errno::ENOSPC);
        }

        let range = IrqRange { base, count };
        let mut st = self.inner.lock();
        if st.controllers.iter().any(|s| s.range.overlaps(&range)) {
            return Err(Errno::EEXIST);
        }

        crate::kinfo!("(IRQ) Controlador registrado, base:", base.0);
        st.controllers.push(ControllerSlot { range, chip });
        st.next_free = st.next_free.max(end);
        Ok(range)
    }

    /// Override ISA → GSI (MADT Interrupt Source Override).
    pub fn set_isa_override(&self, isa: u8, gsi: GlobalIrq, trigger: TriggerMode) -> KResult<()> {
        if isa >= ISA_IRQ_COUNT {
            return Err(Errno::EINVAL);
        }
        self.inner.lock().isa_overrides[isa as usize] = Some(IsaOverride { gsi, trigger });
        Ok(())
    }

    /// Número global de uma linha ISA.
    pub fn isa_to_global(&self, isa: u8) -> KResult<GlobalIrq> {
        if isa >= ISA_IRQ_COUNT {
            return Err(Errno::EINVAL);
        }
        let st = self.inner.lock();
        Ok(st.isa_overrides[isa as usize].map_or(GlobalIrq(isa as u32), |o| o.gsi))
    }

    /// Controlador e linha local de um número global. `ENODEV` se nenhum
    /// controlador cobre o número.
    pub fn translate(&self, gsi: GlobalIrq) -> KResult<(Arc<dyn IrqController>, u32)> {
        let st = self.inner.lock();
        st.controllers
            .iter()
            .find(|s| s.range.contains(gsi))
            .map(|s| (s.chip.clone(), gsi.0 - s.range.base.0))
            .ok_or(Errno::ENODEV)
    }

    pub fn vector_of(&self, gsi: GlobalIrq) -> KResult<u8> {
        u8::try_from(gsi.0 + IRQ_VECTOR_BASE as u32).map_err(|_| Errno::EINVAL)
    }

    pub fn global_of_vector(&self, vector: u8) -> KResult<GlobalIrq> {
        vector
            .checked_sub(IRQ_VECTOR_BASE)
            .map(|v| GlobalIrq(v as u32))
            .ok_or(Errno::EINVAL)
    }

    /// Programa a linha para entregar seu vetor em `dest`. O trigger vem do
    /// override ISA, se houver um apontando para esta linha.
    pub fn route(&self, gsi: GlobalIrq, dest: CoreId) -> KResult<()> {
        let (chip, line) = self.translate(gsi)?;
        let vector = self.vector_of(gsi)?;
        let trigger = {
            let st = self.inner.lock();
            st.isa_overrides
                .iter()
                .flatten()
                .find(|o| o.gsi == gsi)
                .map_or(TriggerMode::EdgeHigh, |o| o.trigger)
        };
        chip.route(line, vector, dest, trigger);
        Ok(())
    }

    pub fn enable(&self, gsi: GlobalIrq) -> KResult<()> {
        let (chip, line) = self.translate(gsi)?;
        chip.enable(line);
        Ok(())
    }

    pub fn disable(&self, gsi: GlobalIrq) -> KResult<()> {
        let (chip, line) = self.translate(gsi)?;
        chip.disable(line);
        Ok(())
    }

    pub fn end_of_interrupt(&self, gsi: GlobalIrq) -> KResult<()> {
        let (chip, line) = self.translate(gsi)?;
        chip.end_of_interrupt(line);
        Ok(())
    }

    /// Instala o handler de dispositivo de uma linha. `EBUSY` se já houver um.
    pub fn install_handler(&self, gsi: GlobalIrq, handler: IrqHandler) -> KResult<()> {
        self.translate(gsi)?;
        let mut st = self.inner.lock();
        if st.handlers.contains_key(&gsi) {
            return Err(Errno::EBUSY);
        }
        st.handlers.insert(gsi, handler);
        Ok(())
    }

    pub fn remove_handler(&self, gsi: GlobalIrq) -> KResult<()> {
        self.inner
            .lock()
            .handlers
            .remove(&gsi)
            .map(|_| ())
            .ok_or(Errno::ENODEV)
    }

    /// Roda o handler da linha, fora do lock do registro. Retorna `false`
    /// (e conta como espúria) se não houver handler.
    pub fn dispatch(&self, gsi: GlobalIrq) -> bool {
        let handler = {
            let mut st = self.inner.lock();
            match st.handlers.get(&gsi) {
                Some(h) => h.clone(),
                None => {
                    st.spurious += 1;
                    return false;
                }
            }
        };
        handler(gsi);
        true
    }

    pub fn spurious_count(&self) -> u64 {
        self.inner.lock().spurious
    }
}

impl Default for IrqRegistry {
    fn default() -> Self {
        Self::new()
    }
}
