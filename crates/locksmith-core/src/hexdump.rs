//! Dump-file rendering: fixed-width byte rows for operator display and
//! programmatic inspection.

use crate::error::LocksmithResult;
use std::path::Path;

/// Bytes per row in the rendered grid. Matches the Mifare Classic block
/// size, so each row of a 1K dump is one block.
pub const ROW_WIDTH: usize = 16;

/// A dump file's bytes grouped into rows of [`ROW_WIDTH`], file order.
/// The final row may be shorter; it is never padded.
pub type HexTable = Vec<Vec<u8>>;

/// Read a dump file and chunk it into a [`HexTable`]. When `display` is
/// set the grid is also printed for the operator; the returned table is
/// the same either way.
pub async fn read_hex_file(path: &Path, display: bool) -> LocksmithResult<HexTable> {
    let bytes = tokio::fs::read(path).await?;
    let table: HexTable = bytes.chunks(ROW_WIDTH).map(|chunk| chunk.to_vec()).collect();

    if display {
        print!("{}", render(&table));
    }

    Ok(table)
}

/// Format the table as an offset-prefixed hex grid.
pub fn render(table: &HexTable) -> String {
    let mut out = String::new();
    for (index, row) in table.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|byte| format!("{byte:02x}")).collect();
        out.push_str(&format!("{:04x}  {}\n", index * ROW_WIDTH, cells.join(" ")));
    }
    out
}
