//! Default European large-cap basket.

use super::sectors::{Company, Sector, SectorUniverse};

/// The default 18-company European basket, classified by GICS sector.
pub fn european_basket() -> SectorUniverse {
    let companies = [
        ("PUBLICIS GROUPE", "PUB.PA"),
        ("INDUSTRIA DE DISENO TEXTIL", "ITX.MC"),
        ("MICHELIN (CGDE)", "ML.PA"),
        ("BEIERSDORF AG", "BEI.DE"),
        ("HENKEL AG & CO KGAA VOR-PREF", "HEN3.DE"),
        ("LEGAL & GENERAL GROUP PLC", "LGEN.L"),
        ("LONDON STOCK EXCHANGE GROUP", "LSEG.L"),
        ("AVIVA PLC", "AV.L"),
        ("ADYEN NV", "ADYEN.AS"),
        ("STRAUMANN HOLDING AG-REG", "STMN.SW"),
        ("SANOFI", "SAN.PA"),
        ("KONE OYJ-B", "KNEBV.HE"),
        ("SIEMENS ENERGY AG", "ENR.DE"),
        ("AIRBUS SE", "AIR.PA"),
        ("RHEINMETALL AG", "RHM.DE"),
        ("ASML HOLDING NV", "ASML.AS"),
        ("RIO TINTO PLC", "RIO.L"),
        ("RWE AG", "RWE.DE"),
    ]
    .into_iter()
    .map(|(name, symbol)| Company::new(name, symbol))
    .collect();

    let sectors = vec![
        Sector::new("Communication Services", ["PUBLICIS GROUPE"]),
        Sector::new(
            "Consumer Discretionary",
            ["INDUSTRIA DE DISENO TEXTIL", "MICHELIN (CGDE)"],
        ),
        Sector::new(
            "Consumer Staples",
            ["BEIERSDORF AG", "HENKEL AG & CO KGAA VOR-PREF"],
        ),
        Sector::new(
            "Financials",
            [
                "LEGAL & GENERAL GROUP PLC",
                "LONDON STOCK EXCHANGE GROUP",
                "AVIVA PLC",
                "ADYEN NV",
            ],
        ),
        Sector::new("Health Care", ["STRAUMANN HOLDING AG-REG", "SANOFI"]),
        Sector::new(
            "Industrials",
            ["KONE OYJ-B", "SIEMENS ENERGY AG", "AIRBUS SE", "RHEINMETALL AG"],
        ),
        Sector::new("Information Technology", ["ASML HOLDING NV"]),
        Sector::new("Materials", ["RIO TINTO PLC"]),
        Sector::new("Utilities", ["RWE AG"]),
    ];

    SectorUniverse::new(companies, sectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::OTHER_SECTOR;

    #[test]
    fn test_every_company_classified() {
        let basket = european_basket();
        assert_eq!(basket.companies().len(), 18);
        for symbol in basket.symbols() {
            assert_ne!(basket.sector_of(symbol), OTHER_SECTOR, "{symbol}");
        }
    }

    #[test]
    fn test_sector_sizes() {
        let basket = european_basket();
        let total: usize = basket.sector_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 18);
        assert_eq!(basket.symbols_in_sector("Industrials").count(), 4);
        assert_eq!(basket.sector_of("LSEG.L"), "Financials");
    }
}
