//! Framework de testes do kernel (self-tests).
//!
//! Suites rodam no próprio kernel, sem `std`: cada caso é uma `fn` que
//! retorna `TestResult`. Em hosted, os testes de unidade chamam as mesmas
//! suites para que a versão bare metal e a hospedada não divirjam.

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Totais de uma suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteReport {
    pub fn merge(&mut self, other: SuiteReport) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Executa suite de testes
pub fn run_test_suite(name: &str, tests: &[TestCase]) -> SuiteReport {
    crate::kinfo!("=== Executando suite:");
    crate::kinfo!(name);

    let mut report = SuiteReport::default();

    for test in tests {
        match (test.func)() {
            TestResult::Passed => {
                crate::kok!(test.name);
                report.passed += 1;
            }
            TestResult::Failed => {
                crate::kfail!(test.name);
                report.failed += 1;
            }
            TestResult::Skipped => {
                crate::kwarn!(test.name);
                report.skipped += 1;
            }
        }
    }

    crate::kinfo!("Resultados: falhas=", report.failed);
    report
}

/// `true` → `Passed`, `false` → `Failed`.
#[inline]
pub fn check(cond: bool) -> TestResult {
    if cond {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}
