//! Normalized certificate summary built from parsed field records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attest::rules::parse_certificate_date;
use crate::models::record::ParsedDocument;

/// Unit of the heated usable floor area (BRA).
pub const BRA_UNIT: &str = "m²";

/// Unit of the outer wall U-value.
pub const U_VALUE_UNIT: &str = "W/(m²·K)";

/// One row per certificate with the well-known fields pulled out by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCertificate {
    pub title: String,
    pub antall_registrerte_enheter: i64,
    pub postnummer: i64,
    pub sted: String,
    pub kommunenavn: String,
    pub gardsnummer: i64,
    pub bruksnummer: i64,
    pub seksjonsnummer: i64,
    pub bygningsnummer: i64,
    pub merkenummer: String,
    pub dato: Option<NaiveDate>,
    pub innmeldt_av: String,
    pub malt_energibruk: String,
    pub gode_energivaner: String,
    pub bygningskategori: String,
    pub bygningstype: String,
    pub byggeaar: i64,
    pub bra: f64,
    pub bra_unit: String,
    pub u_verdi_yttervegger: f64,
    pub u_verdi_yttervegger_unit: String,
}

impl EnergyCertificate {
    /// Build the summary from a parsed document.
    ///
    /// Missing numbers become 0 and missing text becomes empty. Integer fields
    /// truncate the parsed value.
    pub fn from_document(doc: &ParsedDocument) -> Self {
        let int = |name: &str| doc.value_of(name).map(|v| v as i64).unwrap_or(0);
        let float = |name: &str| doc.value_of(name).unwrap_or(0.0);
        let text = |name: &str| doc.unit_of(name).unwrap_or_default().to_string();

        Self {
            title: doc.title.clone(),
            antall_registrerte_enheter: int("Antall registrerte enheter"),
            postnummer: int("Postnummer"),
            sted: text("Sted"),
            kommunenavn: text("Kommunenavn"),
            gardsnummer: int("Gårdsnummer"),
            bruksnummer: int("Bruksnummer"),
            seksjonsnummer: int("Seksjonsnummer"),
            bygningsnummer: int("Bygningsnummer"),
            merkenummer: text("Merkenummer"),
            dato: doc.unit_of("Dato").and_then(parse_certificate_date),
            innmeldt_av: text("Innmeldt av"),
            malt_energibruk: text("Målt energibruk"),
            gode_energivaner: text("Gode energivaner"),
            bygningskategori: text("Bygningskategori"),
            bygningstype: text("Bygningstype"),
            byggeaar: int("Byggeår"),
            bra: float("BRA"),
            bra_unit: BRA_UNIT.to_string(),
            u_verdi_yttervegger: float("U-verdi for yttervegger"),
            u_verdi_yttervegger_unit: U_VALUE_UNIT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attest::parse_certificate_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_document() {
        let text = r#"
| Antall registrerte enheter | 34 |
| Postnummer | 5527 |
| Sted | HAUGESUND |
| Kommunenavn | Haugesund |
| Gårdsnummer | 12 |
| Bygningsnummer | 300123456 |
| Dato | 18.06.2025 |
| Innmeldt av | Ola Nordmann AS |
| Byggeår | 1978 |
| BRA | 3855.0 m² |
| U-verdi for yttervegger | 0,18 W/(m²·K) |
"#;
        let doc = parse_certificate_text(text).unwrap();
        let cert = EnergyCertificate::from_document(&doc);

        assert_eq!(cert.title, "Energiattest");
        assert_eq!(cert.antall_registrerte_enheter, 34);
        assert_eq!(cert.postnummer, 5527);
        assert_eq!(cert.sted, "HAUGESUND");
        assert_eq!(cert.kommunenavn, "Haugesund");
        assert_eq!(cert.gardsnummer, 12);
        assert_eq!(cert.bruksnummer, 0);
        assert_eq!(cert.bygningsnummer, 300123456);
        assert_eq!(cert.dato, NaiveDate::from_ymd_opt(2025, 6, 18));
        assert_eq!(cert.innmeldt_av, "Ola Nordmann AS");
        assert_eq!(cert.bygningstype, "");
        assert_eq!(cert.byggeaar, 1978);
        assert_eq!(cert.bra, 3855.0);
        assert_eq!(cert.bra_unit, "m²");
        assert_eq!(cert.u_verdi_yttervegger, 0.18);
        assert_eq!(cert.u_verdi_yttervegger_unit, "W/(m²·K)");
    }
}
