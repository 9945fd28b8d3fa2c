//! Sheets v4 `values` and `batchUpdate` endpoints

use super::{check, encode_segment, read_json, ApiClient};
use crate::config::Config;
use crate::error::{Result, TidyError};
use crate::sheet::{rectangular, CellRange, CellValue, Table, TabularStore};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Background of the removal flag column (#b7e1cd)
const CHECKBOX_BACKGROUND: (u8, u8, u8) = (0xb7, 0xe1, 0xcd);

/// Query for `values.get`: formulas keep hyperlinks intact, and dates come
/// back as the text the sheet shows rather than serial numbers
const READ_PARAMS: [(&str, &str); 3] = [
    ("valueRenderOption", "FORMULA"),
    ("dateTimeRenderOption", "FORMATTED_STRING"),
    ("majorDimension", "ROWS"),
];

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

pub struct SheetsClient {
    api: ApiClient,
    base: String,
    spreadsheet_id: String,
    sheet_ids: HashMap<String, i64>,
}

/// Column number to letters: 1 -> A, 27 -> AA
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Sheet name quoted for A1 notation
pub fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

pub fn a1_range(sheet: &str, range: CellRange) -> String {
    format!(
        "{}!{}{}:{}{}",
        quote_sheet(sheet),
        column_letter(range.column),
        range.row,
        column_letter(range.last_column()),
        range.last_row()
    )
}

fn grid_range(sheet_id: i64, range: CellRange) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": range.row - 1,
        "endRowIndex": range.last_row(),
        "startColumnIndex": range.column - 1,
        "endColumnIndex": range.last_column(),
    })
}

/// Rectangular table from a `values.get` response body
fn table_from_values(range: ValueRange) -> Table {
    let grid: Vec<Vec<CellValue>> = range
        .values
        .iter()
        .map(|row| row.iter().map(CellValue::from_json).collect())
        .collect();
    Table::from_grid(rectangular(&grid))
}

fn to_json_rows(values: &[Vec<CellValue>]) -> Vec<Vec<Value>> {
    rectangular(values)
        .iter()
        .map(|row| row.iter().map(CellValue::to_json).collect())
        .collect()
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config.access_token()?, config.google.timeout_secs),
            base: config.google.sheets_api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id()?.to_string(),
            sheet_ids: HashMap::new(),
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.base, encode_segment(&self.spreadsheet_id))
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/values/{}", self.spreadsheet_url(), encode_segment(range))
    }

    /// Numeric id of a sheet, needed by structural updates
    fn sheet_id(&mut self, sheet: &str) -> Result<i64> {
        if let Some(id) = self.sheet_ids.get(sheet) {
            return Ok(*id);
        }
        let response = check(
            "spreadsheets.get",
            self.api
                .request("GET", &self.spreadsheet_url())
                .query("fields", "sheets.properties(sheetId,title)")
                .call(),
        )?;
        let spreadsheet: Spreadsheet = read_json("spreadsheets.get", response)?;
        self.sheet_ids = spreadsheet
            .sheets
            .into_iter()
            .map(|s| (s.properties.title, s.properties.sheet_id))
            .collect();
        self.sheet_ids
            .get(sheet)
            .copied()
            .ok_or_else(|| TidyError::Configuration(format!("no sheet named '{}'", sheet)))
    }

    fn batch_update(&self, requests: Vec<Value>) -> Result<()> {
        check(
            "spreadsheets.batchUpdate",
            self.api
                .request("POST", &format!("{}:batchUpdate", self.spreadsheet_url()))
                .send_json(json!({ "requests": requests })),
        )?;
        Ok(())
    }

    fn clear(&self, range: &str) -> Result<()> {
        check(
            "values.clear",
            self.api
                .request("POST", &format!("{}:clear", self.values_url(range)))
                .send_json(json!({})),
        )?;
        Ok(())
    }
}

impl TabularStore for SheetsClient {
    fn read_all(&self, sheet: &str) -> Result<Table> {
        let mut request = self.api.request("GET", &self.values_url(&quote_sheet(sheet)));
        for (key, value) in READ_PARAMS {
            request = request.query(key, value);
        }
        let response = check("values.get", request.call())?;
        let range: ValueRange = read_json("values.get", response)?;
        Ok(table_from_values(range))
    }

    fn clear_range(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }
        self.clear(&a1_range(sheet, range))
    }

    fn write_range(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<()> {
        let rows = to_json_rows(values);
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        let range = CellRange::new(row, column, rows.len(), columns);
        if range.is_empty() {
            return Ok(());
        }
        let a1 = a1_range(sheet, range);
        check(
            "values.update",
            self.api
                .request("PUT", &self.values_url(&a1))
                .query("valueInputOption", "USER_ENTERED")
                .send_json(json!({
                    "range": a1,
                    "majorDimension": "ROWS",
                    "values": rows,
                })),
        )?;
        Ok(())
    }

    fn append_row(&mut self, sheet: &str, values: &[CellValue]) -> Result<()> {
        let row: Vec<Value> = values.iter().map(CellValue::to_json).collect();
        let range = format!("{}!A1", quote_sheet(sheet));
        check(
            "values.append",
            self.api
                .request("POST", &format!("{}:append", self.values_url(&range)))
                .query("valueInputOption", "USER_ENTERED")
                .query("insertDataOption", "INSERT_ROWS")
                .send_json(json!({ "majorDimension": "ROWS", "values": [row] })),
        )?;
        Ok(())
    }

    fn clear_all(&mut self, sheet: &str) -> Result<()> {
        self.clear(&quote_sheet(sheet))
    }

    fn delete_row(&mut self, sheet: &str, row: usize) -> Result<()> {
        if row == 0 {
            return Err(TidyError::DataShape("rows start at 1".to_string()));
        }
        let sheet_id = self.sheet_id(sheet)?;
        self.batch_update(vec![json!({
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row - 1,
                    "endIndex": row,
                }
            }
        })])
    }

    fn apply_checkboxes(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }
        let sheet_id = self.sheet_id(sheet)?;
        let (r, g, b) = CHECKBOX_BACKGROUND;
        self.batch_update(vec![
            json!({
                "setDataValidation": {
                    "range": grid_range(sheet_id, range),
                    "rule": { "condition": { "type": "BOOLEAN" }, "strict": true }
                }
            }),
            json!({
                "repeatCell": {
                    "range": grid_range(sheet_id, range),
                    "cell": {
                        "userEnteredFormat": {
                            "backgroundColor": {
                                "red": f64::from(r) / 255.0,
                                "green": f64::from(g) / 255.0,
                                "blue": f64::from(b) / 255.0,
                            },
                            "horizontalAlignment": "CENTER",
                            "verticalAlignment": "MIDDLE",
                        }
                    },
                    "fields": "userEnteredFormat(backgroundColor,horizontalAlignment,verticalAlignment)"
                }
            }),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(9), "I");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_a1_range() {
        assert_eq!(a1_range("MyFIles", CellRange::new(2, 1, 3, 9)), "'MyFIles'!A2:I4");
        assert_eq!(a1_range("Bob's", CellRange::new(1, 1, 1, 1)), "'Bob''s'!A1:A1");
    }

    #[test]
    fn test_grid_range_is_zero_based_half_open() {
        let range = grid_range(7, CellRange::new(2, 1, 3, 1));
        assert_eq!(
            range,
            json!({
                "sheetId": 7,
                "startRowIndex": 1,
                "endRowIndex": 4,
                "startColumnIndex": 0,
                "endColumnIndex": 1,
            })
        );
    }

    #[test]
    fn test_reads_dates_as_displayed_text() {
        assert!(READ_PARAMS.contains(&("dateTimeRenderOption", "FORMATTED_STRING")));
        assert!(READ_PARAMS.contains(&("valueRenderOption", "FORMULA")));
    }

    #[test]
    fn test_table_from_values_body() {
        let body = r#"{
            "range": "'MyFIles'!A1:I3",
            "majorDimension": "ROWS",
            "values": [
                ["RemoveMe", "Name", "Link", "Id", "Type", "Size MB", "Created"],
                [true, "a.pdf", "=HYPERLINK(\"https://x/a\", \"View\")", "id-a", "application/pdf", 1.5, "2024-03-01"],
                ["ReMoVeD", "b.pdf"]
            ]
        }"#;
        let range: ValueRange = serde_json::from_str(body).unwrap();
        let table = table_from_values(range);

        assert_eq!(table.header.len(), 7);
        assert_eq!(table.header[5], "Size MB");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Bool(true));
        assert_eq!(
            table.rows[0][2],
            CellValue::text("=HYPERLINK(\"https://x/a\", \"View\")")
        );
        assert_eq!(table.rows[0][5], CellValue::Number(1.5));
        assert_eq!(table.rows[0][6], CellValue::text("2024-03-01"));
        // short rows are padded to the header width
        assert_eq!(table.rows[1].len(), 7);
        assert_eq!(table.rows[1][0], CellValue::text("ReMoVeD"));
        assert!(table.rows[1][6].is_empty());
    }

    #[test]
    fn test_empty_sheet_body_has_no_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range": "'Removed'!A1:Z1000"}"#).unwrap();
        let table = table_from_values(range);
        assert!(table.header.is_empty());
        assert_eq!(table.last_row(), 0);
    }

    #[test]
    fn test_new_requires_spreadsheet_id() {
        let mut config = Config::default();
        config.google.access_token = Some("token".to_string());
        assert!(matches!(
            SheetsClient::new(&config),
            Err(TidyError::Configuration(_))
        ));
        config.sheets.spreadsheet_id = "abc".to_string();
        let client = SheetsClient::new(&config).unwrap();
        assert_eq!(
            client.values_url("'My Files'"),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/%27My%20Files%27"
        );
    }
}
