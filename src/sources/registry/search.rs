//! Search result page: identifier -> internal handle

use crate::config::CompiledLocators;
use crate::extract::{self, Document, ACTION_ANCHOR};
use crate::sources::traits::CompanyId;

use super::TARGET;

/// Internal handle of the first result row that mentions `id` and carries a
/// parseable action token. `None` is a clean "no record".
pub fn find_handle(page: &str, id: &CompanyId, locators: &CompiledLocators) -> Option<String> {
    let doc = Document::parse(page);
    let prefix = locators.labels.search.handle_action_prefix.as_str();

    for cell in extract::cells_containing(doc.root(), id.as_str()) {
        let Some(row) = extract::closest(cell, "tr") else {
            continue;
        };

        for anchor in row.select(&ACTION_ANCHOR) {
            let action = anchor.value().attr("onclick").unwrap_or_default().trim();
            if !action.starts_with(prefix) {
                continue;
            }
            match extract::capture(&locators.handle_pattern, action) {
                Some(handle) => return Some(handle),
                None => tracing::warn!(
                    target: TARGET,
                    "Result row for {} has an unparseable action '{}'",
                    id,
                    action
                ),
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locators() -> CompiledLocators {
        CompiledLocators::embedded().unwrap()
    }

    fn id(s: &str) -> CompanyId {
        CompanyId::new(s).unwrap()
    }

    #[test]
    fn test_handle_from_matching_row() {
        let page = r##"
            <table>
              <tr><td>111111111</td><td><a onclick="show_legal_person(1)">x</a></td></tr>
              <tr><td>404404404</td><td>შპს აკმე</td>
                  <td><a href="#" onclick="show_legal_person(778899)">ნახვა</a></td></tr>
            </table>"##;
        assert_eq!(find_handle(page, &id("404404404"), &locators()).as_deref(), Some("778899"));
    }

    #[test]
    fn test_no_matching_row_is_none() {
        let page = r#"<table><tr><td>111111111</td><td><a onclick="show_legal_person(1)">x</a></td></tr></table>"#;
        assert_eq!(find_handle(page, &id("404404404"), &locators()), None);
        assert_eq!(find_handle("", &id("404404404"), &locators()), None);
    }

    #[test]
    fn test_row_without_numeric_token_is_none() {
        let page = r#"
            <table>
              <tr><td>404404404</td><td><a onclick="show_legal_person(abc)">x</a></td></tr>
              <tr><td>404404404</td><td><a onclick="print_page(55)">x</a></td></tr>
            </table>"#;
        assert_eq!(find_handle(page, &id("404404404"), &locators()), None);
    }
}
