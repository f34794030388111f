use comfy_table::Table;
use unisearch_common::University;

pub const EMPTY_STATE: &str = "No results found";

/// Result table. Zero rows and failed fetches both show the empty-state row.
pub fn result_table(rows: &[University]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "University Name",
        "Abbreviation",
        "Country",
        "More Detail",
    ]);

    if rows.is_empty() {
        table.add_row(vec!["", EMPTY_STATE, "", "", ""]);
        return table;
    }

    for (index, uni) in rows.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            uni.name.clone(),
            uni.abbreviation.clone(),
            format!("{} ↗", uni.country),
            uni.detail_link(),
        ]);
    }
    table
}

/// Full result screen: label line, table, and the pager in the full listing.
pub fn result_screen(label: Option<&str>, rows: &[University], page: Option<u32>) -> String {
    let mut out = format!("Result : {}\n", label.unwrap_or(""));
    out.push_str(&result_table(rows).to_string());
    if let Some(page) = page {
        out.push_str(&format!("\n[prev]  Page {}  [next]", page));
    }
    out
}
