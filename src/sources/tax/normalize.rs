//! Merge of the two tax-authority replies into one [`TaxRecord`]
//!
//! Field precedence (first non-empty wins):
//!
//! | field | first | fallback |
//! |-------|-------|----------|
//! | `id` | public info `id` | row\[4\] |
//! | `name` | row\[2\] | public info `name` |
//! | `entity_type` | public info `legal_form` | row\[1\] |
//! | `status` | row\[0\] | public info `status` |
//! | `registration_number` | row\[5\] | - |
//! | `registration_date` | row\[7\] | - |
//! | `create_date` | public info `id_date` | - |
//! | `address` | public info `address` | - |
//!
//! The row positions were inferred from live replies; the grid carries no
//! column names.

use serde_json::Value;

use super::types::{value_text, Director, Founder, PublicInfoReply, TaxRecord};

pub const ROW_STATUS: usize = 0;
pub const ROW_ENTITY_TYPE: usize = 1;
pub const ROW_NAME: usize = 2;
pub const ROW_ID: usize = 4;
pub const ROW_REGISTRATION_NUMBER: usize = 5;
pub const ROW_REGISTRATION_DATE: usize = 7;

/// Build a record from whichever replies were usable
pub fn merge_tax_record(row: Option<&[Value]>, info: Option<&PublicInfoReply>) -> TaxRecord {
    let cell = |index: usize| -> String {
        row.and_then(|r| r.get(index))
            .map(value_text)
            .unwrap_or_default()
    };
    let public = |pick: fn(&PublicInfoReply) -> &str| -> String {
        info.map(|i| pick(i).to_string()).unwrap_or_default()
    };

    TaxRecord {
        id: first_non_empty(public(|i| i.id.as_str()), cell(ROW_ID)),
        name: first_non_empty(cell(ROW_NAME), public(|i| i.name.as_str())),
        entity_type: first_non_empty(
            public(|i| i.legal_form.as_str()),
            cell(ROW_ENTITY_TYPE),
        ),
        status: first_non_empty(cell(ROW_STATUS), public(|i| i.status.as_str())),
        create_date: public(|i| i.id_date.as_str()),
        registration_number: cell(ROW_REGISTRATION_NUMBER),
        registration_date: cell(ROW_REGISTRATION_DATE),
        address: public(|i| i.address.as_str()),
        directors: info.map(directors).unwrap_or_default(),
        founders: info.map(founders).unwrap_or_default(),
    }
}

fn first_non_empty(preferred: String, fallback: String) -> String {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

fn directors(info: &PublicInfoReply) -> Vec<Director> {
    info.directors
        .iter()
        .flatten()
        .map(|d| Director {
            full_name: d.name.clone(),
            personal_id: d.id.clone(),
            role: d.role.clone(),
        })
        .collect()
}

fn founders(info: &PublicInfoReply) -> Vec<Founder> {
    info.founders
        .iter()
        .flatten()
        .map(|f| Founder {
            full_name: f.name.clone(),
            personal_id: f.id.clone(),
            ownership_percentage: f.percent.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| json!(v)).collect()
    }

    #[test]
    fn test_row_only_precedence() {
        let row = row(&["ACTIVE", "LLC", "Acme", "", "123", "REG1", "", "2020-01-01"]);
        let record = merge_tax_record(Some(row.as_slice()), None);

        assert_eq!(record.status, "ACTIVE");
        assert_eq!(record.entity_type, "LLC");
        assert_eq!(record.name, "Acme");
        assert_eq!(record.id, "123");
        assert_eq!(record.registration_number, "REG1");
        assert_eq!(record.registration_date, "2020-01-01");
        assert_eq!(record.create_date, "");
        assert_eq!(record.address, "");
        assert!(record.directors.is_empty());
        assert!(record.founders.is_empty());
    }

    #[test]
    fn test_public_info_precedence() {
        let row = row(&["ACTIVE", "LLC", "Acme Row", "", "123", "REG1", "", "2020-01-01"]);
        let info: PublicInfoReply = serde_json::from_value(json!({
            "id": "404404404",
            "name": "Acme Public",
            "legal_form": "Limited Liability Company",
            "status": "Registered",
            "id_date": "2001-05-17",
            "address": "Tbilisi, Rustaveli Ave 1"
        }))
        .unwrap();

        let record = merge_tax_record(Some(row.as_slice()), Some(&info));
        assert_eq!(record.id, "404404404");
        assert_eq!(record.name, "Acme Row");
        assert_eq!(record.entity_type, "Limited Liability Company");
        assert_eq!(record.status, "ACTIVE");
        assert_eq!(record.create_date, "2001-05-17");
        assert_eq!(record.address, "Tbilisi, Rustaveli Ave 1");
    }

    #[test]
    fn test_fallbacks_when_preferred_empty() {
        let row = row(&["", "LLC", "", "", "123"]);
        let info: PublicInfoReply = serde_json::from_value(json!({
            "id": "",
            "name": "Acme Public",
            "status": "Registered"
        }))
        .unwrap();

        let record = merge_tax_record(Some(row.as_slice()), Some(&info));
        assert_eq!(record.id, "123");
        assert_eq!(record.name, "Acme Public");
        assert_eq!(record.entity_type, "LLC");
        assert_eq!(record.status, "Registered");
        // Short row: positions 5 and 7 absent
        assert_eq!(record.registration_number, "");
        assert_eq!(record.registration_date, "");
    }

    #[test]
    fn test_people_mapping() {
        let info: PublicInfoReply = serde_json::from_value(json!({
            "Directors": [{"name": "Nino B", "id": "01001000001", "type": "Director"}],
            "Founders": [
                {"name": "Zero Share", "id": "1", "percent": 0},
                {"name": "Unknown Share", "id": "2"},
                {"name": "Half", "id": "3", "percent": 50.5}
            ]
        }))
        .unwrap();

        let record = merge_tax_record(None, Some(&info));
        assert_eq!(
            record.directors,
            vec![Director {
                full_name: "Nino B".into(),
                personal_id: "01001000001".into(),
                role: "Director".into(),
            }]
        );

        let founders = serde_json::to_value(&record.founders).unwrap();
        assert_eq!(founders[0]["ownership_percentage"], json!(0));
        assert!(founders[0]["ownership_percentage"].is_number());
        assert!(founders[1]["ownership_percentage"].is_null());
        assert_eq!(founders[2]["ownership_percentage"], json!(50.5));
    }
}
