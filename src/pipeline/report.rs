use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of one run. Per-symbol errors end up in `failures`, never in a `Result`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub symbols_found: usize,
    pub symbols_rendered: usize,
    pub symbols_skipped: usize,
    pub failures: Vec<SymbolFailure>,
}
