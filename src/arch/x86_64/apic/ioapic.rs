//! Driver do I/O APIC.
//!
//! Roteia linhas de interrupção de hardware para vetores da IDT em um núcleo
//! de destino. Acesso indireto: escreve-se o índice em IOREGSEL e lê/escreve
//! o valor em IOWIN.

use core::ptr::NonNull;

use bitflags::bitflags;
use volatile::VolatilePtr;

use super::lapic;
use crate::core::irq::{IrqController, TriggerMode};
use crate::sync::Spinlock;
use crate::sys::CoreId;

// Offsets de registradores (em u32)
const REG_IOREGSEL: usize = 0x00;
const REG_IOWIN: usize = 0x10 / 4;

// Índices internos
const IDX_VER: u32 = 0x01;
const IDX_REDTBL_BASE: u32 = 0x10;

bitflags! {
    /// Bits da metade baixa de uma entrada de redirecionamento.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RedirectionFlags: u32 {
        const LOGICAL_DEST = 1 << 11;
        const ACTIVE_LOW   = 1 << 13;
        const LEVEL        = 1 << 15;
        const MASKED       = 1 << 16;
    }
}

impl From<TriggerMode> for RedirectionFlags {
    fn from(mode: TriggerMode) -> Self {
        match mode {
            TriggerMode::EdgeHigh => Self::empty(),
            TriggerMode::EdgeLow => Self::ACTIVE_LOW,
            TriggerMode::LevelHigh => Self::LEVEL,
            TriggerMode::LevelLow => Self::LEVEL | Self::ACTIVE_LOW,
        }
    }
}

pub struct IoApic {
    base: NonNull<u32>,
    lines: u32,
    // IOREGSEL/IOWIN é um par: a seleção e o acesso precisam ser atômicos
    select: Spinlock<()>,
}

// O MMIO é serializado por `select`.
unsafe impl Send for IoApic {}
unsafe impl Sync for IoApic {}

impl IoApic {
    /// Abre o I/O APIC mapeado em `base` e mascara todas as entradas.
    ///
    /// # Safety
    /// `base` precisa ser o MMIO de um I/O APIC, mapeado como não-cacheável.
    pub unsafe fn new(base: NonNull<u32>) -> Self {
        let mut chip = Self {
            base,
            lines: 0,
            select: Spinlock::new(()),
        };

        // Bits 16-23 de VER: índice da última entrada
        chip.lines = ((chip.read(IDX_VER) >> 16) & 0xFF) + 1;

        for line in 0..chip.lines {
            chip.write(redtbl_low(line), RedirectionFlags::MASKED.bits());
            chip.write(redtbl_low(line) + 1, 0);
        }

        crate::kinfo!("(IOAPIC) Entradas de redirecionamento:", chip.lines);
        chip
    }

    fn read(&self, index: u32) -> u32 {
        let _sel = self.select.lock();
        unsafe {
            VolatilePtr::new(self.base.add(REG_IOREGSEL)).write(index);
            VolatilePtr::new(self.base.add(REG_IOWIN)).read()
        }
    }

    fn write(&self, index: u32, value: u32) {
        let _sel = self.select.lock();
        unsafe {
            VolatilePtr::new(self.base.add(REG_IOREGSEL)).write(index);
            VolatilePtr::new(self.base.add(REG_IOWIN)).write(value);
        }
    }

    fn update(&self, line: u32, f: impl FnOnce(RedirectionFlags) -> RedirectionFlags) {
        let low = self.read(redtbl_low(line));
        let vector = low & 0xFF;
        let flags = f(RedirectionFlags::from_bits_truncate(low));
        self.write(redtbl_low(line), vector | flags.bits());
    }
}

#[inline]
fn redtbl_low(line: u32) -> u32 {
    IDX_REDTBL_BASE + 2 * line
}

impl IrqController for IoApic {
    fn name(&self) -> &'static str {
        "ioapic"
    }

    fn line_count(&self) -> u32 {
        self.lines
    }

    fn route(&self, line: u32, vector: u8, dest: CoreId, trigger: TriggerMode) {
        let flags = RedirectionFlags::from(trigger) | RedirectionFlags::MASKED;
        // Destino físico: bits 56-63 (APIC ID)
        self.write(redtbl_low(line) + 1, dest.0 << 24);
        self.write(redtbl_low(line), vector as u32 | flags.bits());
    }

    fn enable(&self, line: u32) {
        self.update(line, |f| f - RedirectionFlags::MASKED);
    }

    fn disable(&self, line: u32) {
        self.update(line, |f| f | RedirectionFlags::MASKED);
    }

    fn end_of_interrupt(&self, _line: u32) {
        unsafe { lapic::eoi() };
    }
}
