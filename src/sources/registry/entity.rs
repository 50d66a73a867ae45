//! Entity detail page: metadata and application stubs

use std::collections::BTreeMap;

use scraper::ElementRef;

use super::types::{ApplicationStub, EntityMetadata};
use super::TARGET;
use crate::config::CompiledLocators;
use crate::extract::{self, Document, Row, ACTION_ANCHOR, ANCHOR, DIV, LINK_ANCHOR};

/// Everything the pipeline needs from the entity page
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPage {
    pub metadata: EntityMetadata,
    /// Qualifying application rows, in page order
    pub applications: Vec<ApplicationStub>,
}

pub fn parse_entity_page(page: &str, locators: &CompiledLocators) -> EntityPage {
    let doc = Document::parse(page);
    let root = doc.root();

    EntityPage {
        metadata: entity_metadata(root, locators),
        applications: application_stubs(&doc, locators),
    }
}

fn entity_metadata(root: ElementRef<'_>, locators: &CompiledLocators) -> EntityMetadata {
    let labels = &locators.labels.entity;

    EntityMetadata {
        identification_code: extract::field(root, &labels.identification_code),
        name: extract::field(root, &labels.name),
        legal_form: extract::field(root, &labels.legal_form),
        registration_date: extract::field(root, &labels.registration_date),
        status_text: status_text(root, &labels.status),
        reporting_link: reporting_link(root, &labels.reporting_link_substring),
        documents: document_links(root, locators),
    }
}

/// Status is wrapped in a `div` inside the value cell; fall back to the cell
fn status_text(root: ElementRef<'_>, label: &str) -> String {
    let Some(cell) = extract::value_cell(root, label) else {
        return String::new();
    };
    let wrapped = extract::all_text(cell, &DIV);
    if wrapped.is_empty() {
        extract::text(cell)
    } else {
        wrapped
    }
}

fn reporting_link(root: ElementRef<'_>, substring: &str) -> String {
    if substring.is_empty() {
        return String::new();
    }
    root.select(&LINK_ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(substring))
        .map(|href| href.trim().to_string())
        .unwrap_or_default()
}

fn document_links(root: ElementRef<'_>, locators: &CompiledLocators) -> BTreeMap<String, String> {
    let labels = &locators.labels.entity;
    let mut documents = BTreeMap::new();

    let Some(cell) = extract::value_cell(root, &labels.documents_label) else {
        return documents;
    };

    for anchor in cell.select(&ANCHOR) {
        let text = extract::text(anchor);
        let href = anchor.value().attr("href").map(str::trim).unwrap_or_default();
        if text.is_empty() || href.is_empty() {
            continue;
        }
        for doc in &labels.documents {
            if text.contains(&doc.anchor_text) {
                documents.insert(doc.key.clone(), href.to_string());
            }
        }
    }

    documents
}

fn application_stubs(doc: &Document, locators: &CompiledLocators) -> Vec<ApplicationStub> {
    let expected_cells = locators.labels.entity.application_cells;

    extract::rows(doc.root(), &locators.application_rows)
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let cells = row.cells();
            if cells.len() != expected_cells {
                tracing::debug!(
                    target: TARGET,
                    "Skipping application row {}: {} cells",
                    index + 1,
                    cells.len()
                );
                return None;
            }
            let stub = application_stub(row, cells[0], locators);
            if stub.is_none() {
                tracing::warn!(
                    target: TARGET,
                    "Could not extract app_id for application row {}",
                    index + 1
                );
            }
            stub
        })
        .collect()
}

fn application_stub(
    row: Row<'_>,
    action_cell: ElementRef<'_>,
    locators: &CompiledLocators,
) -> Option<ApplicationStub> {
    let action = extract::first_attr(action_cell, &ACTION_ANCHOR, "onclick")?;
    let app_id = extract::capture(&locators.application_action, &action)?;

    Some(ApplicationStub {
        app_id,
        registration_number: row.cell_text(1),
        service_type: row.cell_text(2),
        status: row.cell_text(3),
        date: row.cell_text(4),
    })
}
