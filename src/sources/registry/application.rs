//! Per-application detail fetch and parse
//!
//! Every application listed on the entity page has its own page with four
//! repeated sections (prepared documents, status history, scanned documents,
//! payments) and a metadata block. Sections are located by caption text;
//! a missing section is an empty list, never an error.
//!
//! A fetch never fails from the caller's point of view: transport errors and
//! non-200 replies come back as [`ApplicationDetail::Failed`].

use std::sync::Arc;
use std::time::Duration;

use scraper::ElementRef;

use super::types::{
    ApplicationDetail, ApplicationDetails, ApplicationMetadata, Payment, PreparedDocument,
    ScannedDocument, StatusEntry,
};
use super::TARGET;
use crate::config::{CompiledLocators, IntelConfig};
use crate::extract::{
    self, Document, Row, ANCHOR, IMG, LIST_ITEM, MAIN_TEXT, PARAGRAPH, SMALL_TEXT, SPAN,
};
use crate::http::{HttpClient, HttpRequest};

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Fetches application pages. Cheap to clone; one clone per concurrent fetch.
#[derive(Clone)]
pub struct ApplicationFetcher {
    http: Arc<dyn HttpClient>,
    locators: Arc<CompiledLocators>,
    registry_url: String,
    entity_referer: String,
    user_agent: String,
    timeout: Duration,
}

impl ApplicationFetcher {
    pub fn new(
        http: Arc<dyn HttpClient>,
        locators: Arc<CompiledLocators>,
        config: &IntelConfig,
    ) -> Self {
        Self {
            http,
            locators,
            registry_url: config.registry_url.clone(),
            entity_referer: config.registry_entity_referer(),
            user_agent: config.user_agent.clone(),
            timeout: config.registry_timeout(),
        }
    }

    pub async fn fetch_application_detail(&self, app_id: &str) -> ApplicationDetail {
        tracing::debug!(target: TARGET, "Fetching details for app_id {}", app_id);

        let request = HttpRequest::get(&self.registry_url)
            .query("c", "app")
            .query("m", "show_app")
            .query("app_id", app_id)
            .query("parent", "personPage")
            .query("personID", "")
            .header("User-Agent", &self.user_agent)
            .header("Accept", ACCEPT_HTML)
            .header("Referer", &self.entity_referer)
            .timeout(self.timeout);

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(target: TARGET, "Error processing app_id {}: {}", app_id, e);
                return ApplicationDetail::failed(
                    "Failed to process application details",
                    Some(e.to_string()),
                );
            }
        };

        if !response.is_ok() {
            tracing::warn!(
                target: TARGET,
                "Details request failed for app_id {} with status {}",
                app_id,
                response.status
            );
            return ApplicationDetail::failed(
                format!("Failed to fetch details, status: {}", response.status),
                None,
            );
        }

        ApplicationDetail::Parsed(parse_application_page(
            &response.body,
            app_id,
            &self.locators,
        ))
    }
}

/// Parse one application page. Total: absent sections yield empty values.
pub fn parse_application_page(
    page: &str,
    app_id: &str,
    locators: &CompiledLocators,
) -> ApplicationDetails {
    let doc = Document::parse(page);
    let root = doc.root();
    let labels = &locators.labels.application;

    let mut metadata = ApplicationMetadata::default();
    let mut payments = Vec::new();

    let caption = format!("{} {}", labels.metadata_caption_prefix, app_id);
    if let Some(table) = extract::tables_with_caption(root, &caption).into_iter().next() {
        metadata.registration_number = extract::field(table, &labels.registration_number);
        metadata.service_type = extract::field(table, &labels.service_type);
        metadata.service_cost_description = extract::field(table, &labels.service_cost);
        metadata.payable_amount_balance = extract::field(table, &labels.payable_balance);
        payments = payment_rows(table, locators);
    }

    match doc.select(&locators.applicant_region).into_iter().next() {
        Some(region) => applicant_block(region, locators, &mut metadata),
        None => tracing::warn!(
            target: TARGET,
            "Could not find applicant details table for app_id {}",
            app_id
        ),
    }

    ApplicationDetails {
        prepared_documents: extract::rows_under_caption(root, &labels.prepared_documents_caption)
            .into_iter()
            .filter_map(prepared_document)
            .collect(),
        status_history: extract::rows_under_caption(root, &labels.status_history_caption)
            .into_iter()
            .filter_map(status_entry)
            .collect(),
        scanned_documents: extract::rows_under_caption(root, &labels.scanned_documents_caption)
            .into_iter()
            .filter_map(scanned_document)
            .collect(),
        payments,
        metadata,
    }
}

/// Href of the first anchor in `cell` and the alt text of its icon
fn link_and_kind(cell: ElementRef<'_>) -> (Option<String>, Option<String>) {
    match cell.select(&ANCHOR).next() {
        Some(anchor) => (
            anchor
                .value()
                .attr("href")
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            extract::first_attr(anchor, &IMG, "alt"),
        ),
        None => (None, None),
    }
}

fn prepared_document(row: Row<'_>) -> Option<PreparedDocument> {
    let cells = row.cells();
    if cells.len() < 2 {
        return None;
    }
    let (link, kind) = link_and_kind(cells[0]);
    Some(PreparedDocument {
        name: extract::first_text(cells[1], &MAIN_TEXT),
        date: extract::last_text(cells[1], &MAIN_TEXT),
        link,
        kind,
    })
}

fn status_entry(row: Row<'_>) -> Option<StatusEntry> {
    let cells = row.cells();
    if cells.len() < 3 {
        return None;
    }
    let (link, kind) = link_and_kind(cells[0]);
    let decision = extract::all_text(cells[2], &PARAGRAPH);
    Some(StatusEntry {
        id: extract::first_text(cells[1], &MAIN_TEXT),
        date: extract::first_text(cells[1], &SMALL_TEXT),
        status_text: extract::first_text(cells[2], &SPAN),
        decision: (!decision.is_empty()).then_some(decision),
        link,
        kind,
    })
}

fn scanned_document(row: Row<'_>) -> Option<ScannedDocument> {
    let cells = row.cells();
    if cells.len() < 3 {
        return None;
    }
    let (name_link, _) = link_and_kind(cells[2]);
    let (icon_link, _) = link_and_kind(cells[0]);
    Some(ScannedDocument {
        name: extract::first_text(cells[2], &ANCHOR),
        date: extract::first_text(cells[1], &MAIN_TEXT),
        link: name_link.or(icon_link),
    })
}

fn payment_rows(table: ElementRef<'_>, locators: &CompiledLocators) -> Vec<Payment> {
    let labels = &locators.labels.application;

    extract::rows(table, &locators.payment_rows)
        .into_iter()
        .filter(|row| row.cells().len() == labels.payment_cells && !row.has_header_cells())
        .filter_map(|row| {
            let status = row.cell_text(0);
            if status.is_empty() || status.contains(&labels.debt_marker) {
                return None;
            }
            Some(Payment {
                status,
                amount: row.cell_text(1),
                bank: row.cell_text(2),
                receipt_number: row.cell_text(3),
                date: row.cell_text(4),
            })
        })
        .collect()
}

fn applicant_block(
    region: ElementRef<'_>,
    locators: &CompiledLocators,
    metadata: &mut ApplicationMetadata,
) {
    let labels = &locators.labels.application;

    if let Some(cell) = extract::value_cell(region, &labels.applicant) {
        metadata.applicant_name_id = extract::first_child_text(cell);
        metadata.applicant_address = extract::all_text(cell, &SPAN);
    }
    if let Some(cell) = extract::value_cell(region, &labels.representative) {
        metadata.representative_name_id = extract::first_child_text(cell);
        metadata.representative_address = extract::all_text(cell, &SPAN);
    }

    if let Some(cell) = extract::value_cell(region, &labels.attached_documents) {
        metadata
            .attached_documents
            .extend(cell.select(&LIST_ITEM).map(extract::text));
    }
    if let Some(cell) = extract::value_cell(region, &labels.additional_documents) {
        metadata.attached_documents.extend(
            cell.select(&LIST_ITEM)
                .map(|li| format!("{}{}", extract::text(li), labels.additional_documents_suffix)),
        );
    }

    metadata.note = extract::field(region, &labels.note);
}
