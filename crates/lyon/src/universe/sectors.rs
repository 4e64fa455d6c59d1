//! Company, symbol and sector mappings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sector assigned to symbols without a known sector.
pub const OTHER_SECTOR: &str = "Other";

/// A listed company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Display name.
    pub name: String,
    /// Ticker symbol with exchange suffix.
    pub symbol: String,
}

impl Company {
    /// Create a new company.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// A sector label and the names of its member companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    /// Sector label.
    pub name: String,
    /// Member company names.
    pub companies: Vec<String>,
}

impl Sector {
    /// Create a new sector.
    pub fn new(name: impl Into<String>, companies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            companies: companies.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UniverseFile {
    companies: Vec<Company>,
    #[serde(default)]
    sectors: Vec<Sector>,
}

/// Ordered companies with a sector classification.
///
/// Symbol order is the order of `companies` and drives the order of the
/// analytics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UniverseFile", into = "UniverseFile")]
pub struct SectorUniverse {
    companies: Vec<Company>,
    sectors: Vec<Sector>,
    symbol_to_company: HashMap<String, usize>,
    company_to_sector: HashMap<String, usize>,
}

impl SectorUniverse {
    /// Build a universe. A company listed under several sectors keeps the
    /// first one.
    pub fn new(companies: Vec<Company>, sectors: Vec<Sector>) -> Self {
        let symbol_to_company = companies
            .iter()
            .enumerate()
            .map(|(i, c)| (c.symbol.clone(), i))
            .collect();

        let mut company_to_sector = HashMap::new();
        for (i, sector) in sectors.iter().enumerate() {
            for name in &sector.companies {
                company_to_sector.entry(name.clone()).or_insert(i);
            }
        }

        Self {
            companies,
            sectors,
            symbol_to_company,
            company_to_sector,
        }
    }

    /// Companies in universe order.
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// Sectors as configured.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Symbols in universe order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.companies.iter().map(|c| c.symbol.as_str())
    }

    /// Company listed under `symbol`.
    pub fn company_for(&self, symbol: &str) -> Option<&Company> {
        self.symbol_to_company.get(symbol).map(|&i| &self.companies[i])
    }

    /// Display name for `symbol`, the symbol itself when unknown.
    pub fn company_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.company_for(symbol).map_or(symbol, |c| c.name.as_str())
    }

    /// Sector of `symbol`, [`OTHER_SECTOR`] when the symbol or its company is
    /// unclassified.
    pub fn sector_of(&self, symbol: &str) -> &str {
        self.company_for(symbol)
            .and_then(|c| self.company_to_sector.get(&c.name))
            .map_or(OTHER_SECTOR, |&i| self.sectors[i].name.as_str())
    }

    /// Symbols of the companies in `sector`, in universe order.
    pub fn symbols_in_sector<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.symbols().filter(move |s| self.sector_of(s) == sector)
    }

    /// Number of companies per sector label, in sector order.
    pub fn sector_counts(&self) -> Vec<(&str, usize)> {
        self.sectors
            .iter()
            .map(|s| (s.name.as_str(), self.symbols_in_sector(&s.name).count()))
            .collect()
    }
}

impl From<UniverseFile> for SectorUniverse {
    fn from(file: UniverseFile) -> Self {
        Self::new(file.companies, file.sectors)
    }
}

impl From<SectorUniverse> for UniverseFile {
    fn from(universe: SectorUniverse) -> Self {
        Self {
            companies: universe.companies,
            sectors: universe.sectors,
        }
    }
}
