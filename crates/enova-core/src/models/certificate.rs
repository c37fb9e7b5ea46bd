//! Public Energiattest API: query parameters, response items and flattened rows.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Longest exception text kept in a request log message.
pub const MAX_LOG_MESSAGE_CHARS: usize = 100;

/// One set of property identifiers to look certificates up by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateQuery {
    pub imphist_id: i64,
    pub kommunenummer: Option<String>,
    pub gardsnummer: Option<String>,
    pub bruksnummer: Option<String>,
    pub seksjonsnummer: Option<String>,
    pub bruksenhetnummer: Option<String>,
    pub bygningsnummer: Option<String>,
}

impl CertificateQuery {
    fn parameters(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("kommunenummer", &self.kommunenummer),
            ("gardsnummer", &self.gardsnummer),
            ("bruksnummer", &self.bruksnummer),
            ("seksjonsnummer", &self.seksjonsnummer),
            ("bruksenhetnummer", &self.bruksenhetnummer),
            ("bygningsnummer", &self.bygningsnummer),
        ]
    }

    /// Request body: only parameters that are set and not `""` or `" "`.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        for (key, value) in self.parameters() {
            if let Some(value) = value.as_deref().filter(|v| !matches!(*v, "" | " ")) {
                body.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        Value::Object(body)
    }

    /// Value sent for a parameter, if any.
    pub fn sent(&self, key: &str) -> Option<String> {
        self.payload()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// One item of the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateListing {
    pub energiattest: Attest,
    pub enhet: Unit,
    #[serde(default)]
    pub organisasjonsnummer: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attest {
    pub attestnummer: String,
    pub attest_url: String,
    pub energikarakter: Option<Value>,
    #[serde(default)]
    pub oppvarmingskarakter: Option<Value>,
    #[serde(default)]
    pub utstedelsesdato: Option<Value>,
    #[serde(default)]
    pub registering: Registration,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(rename = "beregnetLevertEnergiTotaltkWhm2", default)]
    pub levert_energi_kwh_m2: Option<Value>,
    #[serde(rename = "beregnetLevertEnergiTotaltkWh", default)]
    pub levert_energi_kwh: Option<Value>,
    #[serde(rename = "harEnergivurdering", default)]
    pub har_energivurdering: Option<Value>,
    #[serde(rename = "energivurderingdato", default)]
    pub energivurdering_dato: Option<Value>,
    #[serde(rename = "beregnetFossilandel", default)]
    pub fossilandel: Option<Value>,
    #[serde(default)]
    pub materialvalg: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Unit {
    pub bruksareal: Option<Value>,
    #[serde(default)]
    pub adresse: StreetAddress,
    #[serde(default)]
    pub matrikkel: Cadastre,
    #[serde(default)]
    pub bygg: Building,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreetAddress {
    #[serde(default)]
    pub gatenavn: Option<Value>,
    #[serde(default)]
    pub postnummer: Option<Value>,
    #[serde(default)]
    pub poststed: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cadastre {
    #[serde(default)]
    pub kommunenummer: Option<Value>,
    #[serde(rename = "gårdsnummer", default)]
    pub gardsnummer: Option<Value>,
    #[serde(default)]
    pub bruksnummer: Option<Value>,
    #[serde(default)]
    pub festenummer: Option<Value>,
    #[serde(default)]
    pub seksjonsnummer: Option<Value>,
    #[serde(default)]
    pub andelsnummer: Option<Value>,
    #[serde(default)]
    pub bruksenhetsnummer: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Building {
    #[serde(default)]
    pub bygningsnummer: Option<Value>,
    #[serde(rename = "byggeår", default)]
    pub byggeaar: Option<Value>,
    #[serde(default)]
    pub kategori: Option<Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
}

/// Certificate file name derived from its URL: last path segment without `.pdf`.
pub fn merkenummer_from_url(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.split(".pdf").next().unwrap_or(last).to_string()
}

/// Render a loosely typed JSON scalar as text. `null` stays absent.
fn scalar(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Flattened certificate row, one per API response item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRow {
    pub import_date: NaiveDateTime,
    pub imphist_id: i64,
    pub param_kommunenummer: Option<String>,
    pub param_gardsnummer: Option<String>,
    pub param_bruksnummer: Option<String>,
    pub param_seksjonsnummer: Option<String>,
    pub param_bruksenhetnummer: Option<String>,
    pub param_bygningsnummer: Option<String>,
    pub attestnummer: String,
    pub merkenummer: String,
    pub bruksareal: Option<String>,
    pub energikarakter: Option<String>,
    pub oppvarmingskarakter: Option<String>,
    pub attest_url: String,
    pub matrikkel_kommunenummer: Option<String>,
    pub matrikkel_gardsnummer: Option<String>,
    pub matrikkel_bruksnummer: Option<String>,
    pub matrikkel_festenummer: Option<String>,
    pub matrikkel_seksjonsnummer: Option<String>,
    pub matrikkel_andelsnummer: Option<String>,
    pub matrikkel_bruksenhetsnummer: Option<String>,
    pub bygg_bygningsnummer: Option<String>,
    pub bygg_byggear: Option<String>,
    pub bygg_kategori: Option<String>,
    pub bygg_type: Option<String>,
    pub utstedelsesdato: Option<String>,
    pub adresse_gatenavn: Option<String>,
    pub adresse_postnummer: Option<String>,
    pub adresse_poststed: Option<String>,
    pub registering_type: Option<String>,
    pub registering_levert_energi_kwh_m2: Option<String>,
    pub registering_levert_energi_kwh: Option<String>,
    pub registering_har_energivurdering: Option<String>,
    pub registering_energivurdering_dato: Option<String>,
    pub registering_fossilandel: Option<String>,
    pub registering_materialvalg: Option<String>,
    pub organisasjonsnummer: Option<String>,
}

impl CertificateRow {
    pub fn from_listing(
        import_date: NaiveDateTime,
        query: &CertificateQuery,
        listing: &CertificateListing,
    ) -> Self {
        let attest = &listing.energiattest;
        let reg = &attest.registering;
        let unit = &listing.enhet;

        Self {
            import_date,
            imphist_id: query.imphist_id,
            param_kommunenummer: query.sent("kommunenummer"),
            param_gardsnummer: query.sent("gardsnummer"),
            param_bruksnummer: query.sent("bruksnummer"),
            param_seksjonsnummer: query.sent("seksjonsnummer"),
            param_bruksenhetnummer: query.sent("bruksenhetnummer"),
            param_bygningsnummer: query.sent("bygningsnummer"),
            attestnummer: attest.attestnummer.clone(),
            merkenummer: merkenummer_from_url(&attest.attest_url),
            bruksareal: scalar(&unit.bruksareal),
            energikarakter: scalar(&attest.energikarakter),
            oppvarmingskarakter: scalar(&attest.oppvarmingskarakter),
            attest_url: attest.attest_url.clone(),
            matrikkel_kommunenummer: scalar(&unit.matrikkel.kommunenummer),
            matrikkel_gardsnummer: scalar(&unit.matrikkel.gardsnummer),
            matrikkel_bruksnummer: scalar(&unit.matrikkel.bruksnummer),
            matrikkel_festenummer: scalar(&unit.matrikkel.festenummer),
            matrikkel_seksjonsnummer: scalar(&unit.matrikkel.seksjonsnummer),
            matrikkel_andelsnummer: scalar(&unit.matrikkel.andelsnummer),
            matrikkel_bruksenhetsnummer: scalar(&unit.matrikkel.bruksenhetsnummer),
            bygg_bygningsnummer: scalar(&unit.bygg.bygningsnummer),
            bygg_byggear: scalar(&unit.bygg.byggeaar),
            bygg_kategori: scalar(&unit.bygg.kategori),
            bygg_type: scalar(&unit.bygg.kind),
            utstedelsesdato: scalar(&attest.utstedelsesdato),
            adresse_gatenavn: scalar(&unit.adresse.gatenavn),
            adresse_postnummer: scalar(&unit.adresse.postnummer),
            adresse_poststed: scalar(&unit.adresse.poststed),
            registering_type: scalar(&reg.kind),
            registering_levert_energi_kwh_m2: scalar(&reg.levert_energi_kwh_m2),
            registering_levert_energi_kwh: scalar(&reg.levert_energi_kwh),
            registering_har_energivurdering: scalar(&reg.har_energivurdering),
            registering_energivurdering_dato: scalar(&reg.energivurdering_dato),
            registering_fossilandel: scalar(&reg.fossilandel),
            registering_materialvalg: scalar(&reg.materialvalg),
            organisasjonsnummer: scalar(&listing.organisasjonsnummer),
        }
    }
}

/// Outcome of one certificate lookup, as written to the request log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    NoRecords,
    Http(u16),
    Request(String),
    General(String),
}

impl RequestStatus {
    /// Status for a successful response with `records` items.
    pub fn for_records(records: usize) -> Self {
        if records > 0 { Self::Success } else { Self::NoRecords }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let truncate = |s: &str| s.chars().take(MAX_LOG_MESSAGE_CHARS).collect::<String>();
        match self {
            Self::Success => write!(f, "Success"),
            Self::NoRecords => write!(f, "No records found"),
            Self::Http(status) => write!(f, "HTTP Error {}", status),
            Self::Request(e) => write!(f, "Request Exception: {}", truncate(e)),
            Self::General(e) => write!(f, "General Exception: {}", truncate(e)),
        }
    }
}

/// One request log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub imphist_id: i64,
    pub log_date: NaiveDateTime,
    pub kommunenummer: Option<String>,
    pub gardsnummer: Option<String>,
    pub bruksnummer: Option<String>,
    pub seksjonsnummer: Option<String>,
    pub bruksenhetnummer: Option<String>,
    pub bygningsnummer: Option<String>,
    pub records_returned: usize,
    pub status_message: String,
}

impl RequestLogEntry {
    pub fn new(
        log_date: NaiveDateTime,
        query: &CertificateQuery,
        records_returned: usize,
        status: &RequestStatus,
    ) -> Self {
        Self {
            imphist_id: query.imphist_id,
            log_date,
            kommunenummer: query.kommunenummer.clone(),
            gardsnummer: query.gardsnummer.clone(),
            bruksnummer: query.bruksnummer.clone(),
            seksjonsnummer: query.seksjonsnummer.clone(),
            bruksenhetnummer: query.bruksenhetnummer.clone(),
            bygningsnummer: query.bygningsnummer.clone(),
            records_returned,
            status_message: status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 18)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn query() -> CertificateQuery {
        CertificateQuery {
            imphist_id: 42,
            kommunenummer: Some("1106".to_string()),
            gardsnummer: Some("12".to_string()),
            bruksnummer: Some(" ".to_string()),
            seksjonsnummer: Some(String::new()),
            bruksenhetnummer: None,
            bygningsnummer: Some("300123456".to_string()),
        }
    }

    #[test]
    fn test_payload_skips_blank_parameters() {
        assert_eq!(
            query().payload(),
            json!({
                "kommunenummer": "1106",
                "gardsnummer": "12",
                "bygningsnummer": "300123456"
            })
        );
        assert_eq!(query().sent("bruksnummer"), None);
    }

    #[test]
    fn test_merkenummer_from_url() {
        assert_eq!(
            merkenummer_from_url("https://example.no/attester/A2025-136911.pdf"),
            "A2025-136911"
        );
        assert_eq!(merkenummer_from_url("A2025-1.pdf?x=1"), "A2025-1");
        assert_eq!(merkenummer_from_url("no-extension"), "no-extension");
    }

    #[test]
    fn test_row_from_listing() {
        let listing: CertificateListing = serde_json::from_value(json!({
            "energiattest": {
                "attestnummer": "A2025-136911",
                "attestUrl": "https://example.no/pdf/A2025-136911.pdf",
                "energikarakter": "C",
                "oppvarmingskarakter": null,
                "utstedelsesdato": "2025-06-18",
                "registering": {
                    "type": "Enkel",
                    "beregnetLevertEnergiTotaltkWhm2": 145.5,
                    "harEnergivurdering": true
                }
            },
            "enhet": {
                "bruksareal": 80,
                "adresse": { "gatenavn": "Storgata 1", "postnummer": "5527", "poststed": "HAUGESUND" },
                "matrikkel": { "kommunenummer": "1106", "gårdsnummer": 12 },
                "bygg": { "byggeår": 1978, "type": "Boligblokk" }
            },
            "organisasjonsnummer": "987654321"
        }))
        .unwrap();

        let row = CertificateRow::from_listing(now(), &query(), &listing);

        assert_eq!(row.imphist_id, 42);
        assert_eq!(row.param_kommunenummer.as_deref(), Some("1106"));
        assert_eq!(row.param_bruksnummer, None);
        assert_eq!(row.merkenummer, "A2025-136911");
        assert_eq!(row.bruksareal.as_deref(), Some("80"));
        assert_eq!(row.energikarakter.as_deref(), Some("C"));
        assert_eq!(row.oppvarmingskarakter, None);
        assert_eq!(row.matrikkel_gardsnummer.as_deref(), Some("12"));
        assert_eq!(row.bygg_byggear.as_deref(), Some("1978"));
        assert_eq!(row.bygg_type.as_deref(), Some("Boligblokk"));
        assert_eq!(row.registering_levert_energi_kwh_m2.as_deref(), Some("145.5"));
        assert_eq!(row.registering_har_energivurdering.as_deref(), Some("true"));
        assert_eq!(row.registering_materialvalg, None);
        assert_eq!(row.adresse_poststed.as_deref(), Some("HAUGESUND"));
        assert_eq!(row.organisasjonsnummer.as_deref(), Some("987654321"));
    }

    #[test]
    fn test_listing_requires_attest_url() {
        let result: Result<CertificateListing, _> = serde_json::from_value(json!({
            "energiattest": { "attestnummer": "A1", "energikarakter": "C" },
            "enhet": { "bruksareal": 80 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(RequestStatus::for_records(3).to_string(), "Success");
        assert_eq!(RequestStatus::for_records(0).to_string(), "No records found");
        assert_eq!(RequestStatus::Http(503).to_string(), "HTTP Error 503");

        let long = "x".repeat(250);
        let message = RequestStatus::Request(long).to_string();
        assert_eq!(message.len(), "Request Exception: ".len() + 100);
    }

    #[test]
    fn test_log_entry_keeps_raw_parameters() {
        let entry = RequestLogEntry::new(now(), &query(), 0, &RequestStatus::NoRecords);
        assert_eq!(entry.imphist_id, 42);
        assert_eq!(entry.bruksnummer.as_deref(), Some(" "));
        assert_eq!(entry.status_message, "No records found");
    }
}
