//! Spinlock - bloqueio com busy-wait
//!
//! Adquirir um spinlock desabilita interrupções no núcleo atual *antes* de
//! girar, e liberar restaura o estado salvo. Assim um handler de interrupção
//! nunca encontra, no mesmo núcleo, um lock que a tarefa interrompida segura.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch::{Cpu, CpuOps};

/// Spinlock sem dados.
///
/// O estado de interrupções salvo fica no próprio lock (só o dono escreve
/// e lê), por isso `lock`/`unlock` podem ser usados sem guard.
pub struct RawSpinlock {
    held: AtomicBool,
    irq_were_enabled: AtomicBool,
}

impl RawSpinlock {
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
            irq_were_enabled: AtomicBool::new(false),
        }
    }

    /// Adquire o lock, girando até conseguir.
    pub fn lock(&self) {
        let were_enabled = Cpu::are_interrupts_enabled();
        unsafe { Cpu::disable_interrupts() };

        while self
            .held
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // test-and-test-and-set: girar só lendo, sem disputar a linha
            while self.held.load(Ordering::Relaxed) {
                Cpu::relax();
            }
        }

        self.irq_were_enabled.store(were_enabled, Ordering::Relaxed);
    }

    /// Tenta adquirir sem bloquear. Em caso de falha o estado de interrupções
    /// fica exatamente como estava.
    pub fn try_lock(&self) -> bool {
        let were_enabled = Cpu::are_interrupts_enabled();
        unsafe { Cpu::disable_interrupts() };

        if self
            .held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.irq_were_enabled.store(were_enabled, Ordering::Relaxed);
            true
        } else {
            if were_enabled {
                unsafe { Cpu::enable_interrupts() };
            }
            false
        }
    }

    /// Libera o lock e restaura o estado de interrupções salvo por `lock`.
    ///
    /// # Panics
    /// Se o lock não estiver adquirido.
    pub fn unlock(&self) {
        let were_enabled = self.irq_were_enabled.load(Ordering::Relaxed);
        let was_held = self.held.swap(false, Ordering::Release);
        assert!(was_held, "RawSpinlock: unlock de lock livre");

        if were_enabled {
            unsafe { Cpu::enable_interrupts() };
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }

    /// Libera o lock sem tocar em interrupções.
    ///
    /// # Safety
    /// Só para o scheduler: a tarefa que entra após uma troca de contexto
    /// "herda" o lock da anterior, mas não o guard.
    pub unsafe fn force_unlock(&self) {
        self.held.store(false, Ordering::Release);
    }
}

impl Default for RawSpinlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinlock - usa busy-wait, NÃO pode dormir
///
/// # Quando usar
///
/// - Seções críticas MUITO curtas
/// - Dados compartilhados com handlers de interrupção
///
/// # Quando NÃO usar
///
/// - Quando pode chamar funções que dormem (`WaitQueue::wait`)
///
/// Guards devem ser liberados em ordem inversa à aquisição: o mais externo é
/// quem restaura as interrupções.
pub struct Spinlock<T: ?Sized> {
    raw: RawSpinlock,
    data: UnsafeCell<T>,
}

// SAFETY: Spinlock protege acesso com lock atômico
unsafe impl<T: ?Sized + Send> Send for Spinlock<T> {}
unsafe impl<T: ?Sized + Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub const fn new(data: T) -> Self {
        Self {
            raw: RawSpinlock::new(),
            data: UnsafeCell::new(data),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> Spinlock<T> {
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        self.raw.lock();
        SpinlockGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        if self.raw.try_lock() {
            Some(SpinlockGuard {
                lock: self,
                _not_send: PhantomData,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Acesso sem lock: `&mut self` prova exclusividade.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Força o desbloqueio do spinlock (USO INTERNO DO SCHEDULER)
    ///
    /// # Safety
    /// O guard original precisa ter sido esquecido (`mem::forget`) e nenhuma
    /// referência aos dados pode sobreviver a esta chamada.
    pub unsafe fn force_unlock(&self) {
        self.raw.force_unlock();
    }
}

/// Guard do spinlock - libera ao sair do escopo
pub struct SpinlockGuard<'a, T: ?Sized> {
    lock: &'a Spinlock<T>,
    // Precisa ser liberado no núcleo que adquiriu
    _not_send: PhantomData<*const ()>,
}

impl<T: ?Sized> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: Lock está adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinlockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: Lock está adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for SpinlockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.unlock();
    }
}
