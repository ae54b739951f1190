//! Delimited-text export of engine results.
//!
//! Output is UTF-8 with a leading byte-order mark so spreadsheet tools pick
//! the right encoding. The first header cell names the aggregation unit.

use std::io::Write;

use ::csv::WriterBuilder;

use crate::routes::diversity::DiversityRecord;
use crate::routes::matrix::{CommunityMatrix, MatrixCell};
use crate::routes::vegetation::VegetationMatrix;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const DIVERSITY_HEADER: [&str; 5] = [
    "species_richness",
    "shannon_index",
    "simpson_index",
    "evenness",
    "total_individuals",
];

/// Writes the display form of `matrix`: species header, one line per row.
pub fn write_matrix_csv<W: Write>(matrix: &CommunityMatrix, writer: W) -> csv::Result<()> {
    let header = std::iter::once(matrix.options.unit.as_str().to_string())
        .chain(matrix.columns.iter().cloned());
    write_table(writer, header, matrix.rows.iter().zip(matrix.display_rows()))
}

pub fn write_vegetation_csv<W: Write>(matrix: &VegetationMatrix, writer: W) -> csv::Result<()> {
    let header = std::iter::once(matrix.unit.as_str().to_string())
        .chain(matrix.columns.iter().map(|c| c.as_str().to_string()));
    write_table(writer, header, matrix.rows.iter().zip(matrix.display_rows()))
}

/// Writes one line per diversity record; `unit_name` heads the label column.
pub fn write_diversity_csv<W: Write>(
    records: &[DiversityRecord],
    unit_name: &str,
    writer: W,
) -> csv::Result<()> {
    let header = std::iter::once(unit_name.to_string())
        .chain(DIVERSITY_HEADER.iter().map(|h| h.to_string()));
    let rows = records.iter().map(|r| {
        (
            &r.label,
            vec![
                MatrixCell::Number(r.species_richness as f64),
                MatrixCell::Number(r.shannon_index),
                MatrixCell::Number(r.simpson_index),
                MatrixCell::Number(r.evenness),
                MatrixCell::Number(r.total_individuals as f64),
            ],
        )
    });
    write_table(writer, header, rows)
}

/// Renders `matrix` to an in-memory CSV document.
pub fn matrix_csv_bytes(matrix: &CommunityMatrix) -> csv::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_matrix_csv(matrix, &mut buffer)?;
    Ok(buffer)
}

fn write_table<'a, W, H, R>(mut writer: W, header: H, rows: R) -> csv::Result<()>
where
    W: Write,
    H: IntoIterator<Item = String>,
    R: IntoIterator<Item = (&'a String, Vec<MatrixCell>)>,
{
    writer.write_all(UTF8_BOM)?;
    let mut out = WriterBuilder::new().from_writer(writer);
    out.write_record(header)?;
    for (label, cells) in rows {
        let record = std::iter::once(label.clone()).chain(cells.iter().map(|c| c.to_string()));
        out.write_record(record)?;
    }
    out.flush()?;
    Ok(())
}
