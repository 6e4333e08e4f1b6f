// =============================================================================
// KERNEL LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Macros de log do Ember, filtrados em tempo de compilação por features.
// - SEM core::fmt: apenas strings e valores numéricos (hex)
// - SEM alocação
// - Escreve no sink serial (`drivers::serial`)
//
// NÍVEIS (do mais crítico ao menos) e feature mínima que os ativa:
// - ERROR / WARN / OK / FAIL : qualquer configuração exceto `no_logs`
// - INFO                     : log_info, log_debug ou log_trace
// - DEBUG                    : log_debug ou log_trace
// - TRACE                    : log_trace (cada enqueue, troca e wakeup)
//
// USO:
//   kinfo!("(Sched) Núcleo online");            // Apenas string
//   kinfo!("(Sched) Tarefas=", count);          // String + hex
//   klog!("Tid=", tid, " Core=", core);         // Sem prefixo, múltiplos
//
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";
pub const P_OK: &str = "\x1b[32m[OK]\x1b[0m ";
pub const P_FAIL: &str = "\x1b[1;31m[FAIL]\x1b[0m ";

/// Emite uma linha com prefixo. Uso interno dos macros de nível.
#[doc(hidden)]
#[macro_export]
macro_rules! __klog_line {
    ($prefix:expr, $msg:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_nl();
    }};
    ($prefix:expr, $msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_str(" ");
        $crate::drivers::serial::emit_hex($val as u64);
        $crate::drivers::serial::emit_nl();
    }};
}

// =============================================================================
// ERROR / WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($arg:expr),+ $(,)?) => { $crate::__klog_line!($crate::core::logging::P_ERROR, $($arg),+) };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($arg:expr),+ $(,)?) => { $crate::__klog_line!($crate::core::logging::P_WARN, $($arg),+) };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// INFO
// =============================================================================

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kinfo {
    ($($arg:expr),+ $(,)?) => { $crate::__klog_line!($crate::core::logging::P_INFO, $($arg),+) };
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// DEBUG
// =============================================================================

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kdebug {
    ($($arg:expr),+ $(,)?) => { $crate::__klog_line!($crate::core::logging::P_DEBUG, $($arg),+) };
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// TRACE
// =============================================================================

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($arg:expr),+ $(,)?) => { $crate::__klog_line!($crate::core::logging::P_TRACE, $($arg),+) };
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// Log genérico sem prefixo de nível, com até dois valores.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    ($msg:expr) => {{
        $crate::drivers::serial::emit_str($msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
    }};
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::drivers::serial::emit_str($msg1);
        $crate::drivers::serial::emit_hex($val1 as u64);
        $crate::drivers::serial::emit_str($msg2);
        $crate::drivers::serial::emit_hex($val2 as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

/// knl! - Emite apenas newline.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::drivers::serial::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}

/// kok! - Log de sucesso (prefixo verde [OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => { $crate::__klog_line!($crate::core::logging::P_OK, $msg) };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

/// kfail! - Log de falha (prefixo vermelho [FAIL]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => { $crate::__klog_line!($crate::core::logging::P_FAIL, $msg) };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}
