//! Advanced Programmable Interrupt Controller.
//!
//! - `ioapic`: roteia linhas de hardware para vetores/núcleos (um
//!   `IrqController` por chip, registrado no `IrqRegistry`).
//! - `lapic`: apenas o EOI do Local APIC, que o I/O APIC exige ao final de
//!   cada interrupção.

pub mod ioapic;
pub mod lapic;

pub use ioapic::{IoApic, RedirectionFlags};
