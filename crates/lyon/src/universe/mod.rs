//! Investment universes: the companies analysed and their sectors.

pub mod europe;
pub mod sectors;

pub use europe::european_basket;
pub use sectors::{Company, OTHER_SECTOR, Sector, SectorUniverse};

/// Trait for stock universes.
pub trait Universe {
    /// All symbols, in analysis order.
    fn symbols(&self) -> Vec<String>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.symbols().iter().any(|s| s == symbol)
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

impl Universe for SectorUniverse {
    fn symbols(&self) -> Vec<String> {
        self.symbols().map(str::to_string).collect()
    }

    fn contains(&self, symbol: &str) -> bool {
        self.company_for(symbol).is_some()
    }
}
