// CSV export of the dealer price sheet, parsed into typed records.
use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;

use super::DatasetLoader;
use crate::model::{Dataset, LoaderError, ProductRecord};

pub struct SheetLoader {
    path: PathBuf,
}

impl SheetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl DatasetLoader for SheetLoader {
    async fn load(&self) -> Result<Dataset, LoaderError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        parse_sheet(&text, &self.path.display().to_string())
    }
}

/// Parses sheet text into a `Dataset`. Header names beyond the required five
/// become passthrough columns. Rows whose price cell does not parse are
/// dropped with a warning; a missing required column fails the whole load.
pub fn parse_sheet(text: &str, source: &str) -> Result<Dataset, LoaderError> {
    let mut rows = parse_csv(text).into_iter();
    let header = rows.next().ok_or(LoaderError::EmptySheet)?;

    let col = |name: &'static str| -> Result<usize, LoaderError> {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(LoaderError::MissingColumn(name))
    };
    let name_col = col("product_complete_name")?;
    let brand_col = col("brand")?;
    let cat_col = col("cat")?;
    let price_col = col("price")?;
    let dealer_col = col("dealer_id")?;
    let known = [name_col, brand_col, cat_col, price_col, dealer_col];

    let extra_columns: Vec<String> = header
        .iter()
        .enumerate()
        .filter(|(i, _)| !known.contains(i))
        .map(|(_, h)| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (row_no, row) in rows.enumerate() {
        let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");

        let price: f64 = match cell(price_col).parse() {
            Ok(p) => p,
            Err(_) => {
                warn!(
                    "Skipping sheet row {}: bad price '{}'",
                    row_no + 2,
                    cell(price_col)
                );
                skipped += 1;
                continue;
            }
        };

        let name = cell(name_col);
        records.push(ProductRecord {
            dealer_id: cell(dealer_col).to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
            brand: cell(brand_col).to_string(),
            cat: cell(cat_col).to_string(),
            price,
            extras: header
                .iter()
                .enumerate()
                .filter(|(i, _)| !known.contains(i))
                .map(|(i, h)| (h.trim().to_string(), cell(i).to_string()))
                .collect(),
        });
    }
    if skipped > 0 {
        warn!("{} rows dropped from {} (unparsable price)", skipped, source);
    }

    Ok(Dataset {
        records,
        extra_columns,
        source: source.to_string(),
        loaded_at: Utc::now(),
    })
}

/// Minimal CSV reader: quoted fields, doubled-quote escapes, CRLF tolerant.
/// Fully blank lines are skipped.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                if row.iter().any(|f| !f.is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        if row.iter().any(|f| !f.is_empty()) {
            rows.push(row);
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoaderError;

    const HEADER: &str = "dealer_id,product_complete_name,brand,cat,price";

    #[test]
    fn parses_records_in_sheet_order() {
        let text = format!(
            "{HEADER}\nd1,Widget Pro,Acme,X,10\nd2,Widget Lite,Acme,X,8\n"
        );
        let dataset = parse_sheet(&text, "test").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].dealer_id, "d1");
        assert_eq!(dataset.records[0].name.as_deref(), Some("Widget Pro"));
        assert_eq!(dataset.records[1].price, 8.0);
        assert!(dataset.extra_columns.is_empty());
    }

    #[test]
    fn extra_columns_pass_through() {
        let text = format!("{HEADER},stock\nd1,Widget,Acme,X,10,4\n");
        let dataset = parse_sheet(&text, "test").unwrap();
        assert_eq!(dataset.extra_columns, vec!["stock".to_string()]);
        assert_eq!(
            dataset.records[0].extras,
            vec![("stock".to_string(), "4".to_string())]
        );
    }

    #[test]
    fn missing_required_column_fails_the_load() {
        let text = "dealer_id,product_complete_name,brand,price\nd1,Widget,Acme,10\n";
        let err = parse_sheet(text, "test").unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn("cat")));
    }

    #[test]
    fn empty_sheet_fails_the_load() {
        assert!(matches!(
            parse_sheet("", "test").unwrap_err(),
            LoaderError::EmptySheet
        ));
    }

    #[test]
    fn bad_price_rows_are_dropped() {
        let text = format!("{HEADER}\nd1,Widget,Acme,X,oops\nd2,Widget,Acme,X,8\n");
        let dataset = parse_sheet(&text, "test").unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].dealer_id, "d2");
    }

    #[test]
    fn empty_name_cell_becomes_none() {
        let text = format!("{HEADER}\nd1,,Acme,X,10\n");
        let dataset = parse_sheet(&text, "test").unwrap();
        assert_eq!(dataset.records[0].name, None);
    }

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        let text = format!(
            "{HEADER}\nd1,\"Widget, the \"\"Pro\"\" one\",Acme,X,10\n"
        );
        let dataset = parse_sheet(&text, "test").unwrap();
        assert_eq!(
            dataset.records[0].name.as_deref(),
            Some("Widget, the \"Pro\" one")
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = format!("{HEADER}\n\nd1,Widget,Acme,X,10\n\n");
        let dataset = parse_sheet(&text, "test").unwrap();
        assert_eq!(dataset.len(), 1);
    }
}
