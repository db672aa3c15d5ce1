use std::collections::HashSet;

/// Decides whether an extracted symbol is worth fetching.
pub trait SymbolValidator: Send + Sync {
    fn accept(&self, symbol: &str) -> bool;
}

/// Accepts every symbol, false positives included.
pub struct AcceptAll;

impl SymbolValidator for AcceptAll {
    fn accept(&self, _symbol: &str) -> bool {
        true
    }
}

/// Only symbols on a fixed list pass.
pub struct AllowList {
    symbols: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

impl SymbolValidator for AllowList {
    fn accept(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_all_accepts_noise() {
        assert!(AcceptAll.accept("I"));
        assert!(AcceptAll.accept("YOLO"));
    }

    #[test]
    fn allow_list_is_exact() {
        let list = AllowList::new(["GME", "AMC"]);
        assert!(list.accept("GME"));
        assert!(!list.accept("gme"));
        assert!(!list.accept("YOLO"));
    }
}
