//! Tax authority reply types and the normalized tax record
//!
//! Reply shapes:
//! - tabular search: `{"Data": {"Rows": [[status, type, name, _, id, regNum, _, regDate, ...]]}}`
//! - public info: flat object, or `{"Status": -100, "Message": "..."}` on an
//!   internal upstream error

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// `Status` value the public-info endpoint uses for its own internal failure
pub const PUBLIC_INFO_SYSTEM_ERROR: i64 = -100;

// =============================================================================
// Raw replies
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxSearchReply {
    #[serde(rename = "Data", default)]
    pub data: Option<TaxSearchData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxSearchData {
    #[serde(rename = "Rows", default)]
    pub rows: Option<Vec<Value>>,
}

impl TaxSearchReply {
    /// First row of the grid, if the reply carries one
    pub fn into_first_row(self) -> Option<Vec<Value>> {
        self.data?
            .rows?
            .into_iter()
            .next()
            .and_then(|row| match row {
                Value::Array(cells) => Some(cells),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicInfoReply {
    #[serde(rename = "Status", default)]
    pub status_code: Option<Value>,
    #[serde(rename = "Message", default, deserialize_with = "lenient_text")]
    pub message: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub legal_form: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub id_date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: String,

    #[serde(rename = "Directors", default)]
    pub directors: Option<Vec<RawDirector>>,
    #[serde(rename = "Founders", default)]
    pub founders: Option<Vec<RawFounder>>,
}

impl PublicInfoReply {
    pub fn is_system_error(&self) -> bool {
        match &self.status_code {
            Some(Value::Number(n)) => n.as_i64() == Some(PUBLIC_INFO_SYSTEM_ERROR),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok() == Some(PUBLIC_INFO_SYSTEM_ERROR),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDirector {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFounder {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent: Option<Number>,
}

/// Strings, numbers and booleans as text; null or missing as `""`
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null)))
}

/// Numbers kept exactly; numeric strings parsed; anything else is unknown
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(n),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64),
        _ => None,
    })
}

/// Text form of a loosely typed JSON cell
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// =============================================================================
// Normalized record
// =============================================================================

/// Company record as described by the tax authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRecord {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    pub status: String,
    pub create_date: String,
    pub registration_number: String,
    pub registration_date: String,
    pub address: String,
    pub directors: Vec<Director>,
    pub founders: Vec<Founder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    pub full_name: String,
    pub personal_id: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Founder {
    pub full_name: String,
    pub personal_id: String,
    /// `None` when the source did not state a share (distinct from 0%)
    pub ownership_percentage: Option<Number>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row() {
        let reply: TaxSearchReply = serde_json::from_str(
            r#"{"Data":{"Rows":[["ACTIVE","LLC","Acme",null,123]]}}"#,
        )
        .unwrap();
        let row = reply.into_first_row().unwrap();
        assert_eq!(row.len(), 5);
        assert_eq!(value_text(&row[4]), "123");
        assert_eq!(value_text(&row[3]), "");
    }

    #[test]
    fn test_empty_or_missing_rows() {
        for body in [r#"{"Data":{"Rows":[]}}"#, r#"{"Data":{}}"#, r#"{"Data":null}"#, "{}"] {
            let reply: TaxSearchReply = serde_json::from_str(body).unwrap();
            assert!(reply.into_first_row().is_none(), "{body}");
        }
    }

    #[test]
    fn test_public_info_sentinel() {
        let reply: PublicInfoReply =
            serde_json::from_str(r#"{"Status":-100,"Message":"internal error"}"#).unwrap();
        assert!(reply.is_system_error());
        assert_eq!(reply.message, "internal error");

        let ok: PublicInfoReply =
            serde_json::from_str(r#"{"Status":0,"id":404404404,"name":"Acme"}"#).unwrap();
        assert!(!ok.is_system_error());
        assert_eq!(ok.id, "404404404");
    }

    #[test]
    fn test_founder_percent_forms() {
        let founders: Vec<RawFounder> = serde_json::from_str(
            r#"[{"name":"A","percent":0},{"name":"B"},{"name":"C","percent":null},{"name":"D","percent":"12.5"}]"#,
        )
        .unwrap();
        assert_eq!(founders[0].percent, Some(Number::from(0)));
        assert_eq!(founders[1].percent, None);
        assert_eq!(founders[2].percent, None);
        assert_eq!(founders[3].percent.as_ref().and_then(Number::as_f64), Some(12.5));
    }
}
