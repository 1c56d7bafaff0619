//! Writes a deterministic synthetic author table as `sample_authors.csv` and
//! `sample_authors.parquet`, with the same columns as the ranking dataset.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// True with probability `1 / n`.
    fn one_in(&mut self, n: usize) -> bool {
        self.below(n) == 0
    }
}

const FIRST_NAMES: &[&str] = &[
    "John", "Maria", "Wei", "Aisha", "Kenji", "Olga", "Pedro", "Fatima", "Lars", "Priya",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Zhang", "Khan", "Tanaka", "Ivanova", "Silva", "Haddad", "Nilsson",
    "Patel", "Smithson",
];

/// (institution, country code as stored in the source: lowercase alpha-3)
const INSTITUTIONS: &[(&str, &str)] = &[
    ("Harvard University", "usa"),
    ("Stanford University", "usa"),
    ("University of Oxford", "gbr"),
    ("ETH Zurich", "che"),
    ("Tsinghua University", "chn"),
    ("University of Tokyo", "jpn"),
    ("Sorbonne University", "fra"),
    ("University of Sao Paulo", "bra"),
    ("University of Pristina", "xkx"),
];

/// (field, subfields)
const FIELDS: &[(&str, &[&str])] = &[
    ("Clinical Medicine", &["Oncology", "Cardiology", "Immunology"]),
    ("Physics & Astronomy", &["Optics", "Nuclear & Particle Physics"]),
    ("Chemistry", &["Organic Chemistry", "Analytical Chemistry"]),
    ("Information & Communication Technologies", &["Artificial Intelligence", "Networking"]),
];

const ROWS: usize = 500;

struct Row {
    author: String,
    institution: String,
    country: String,
    rank: i64,
    field: String,
    subfield: String,
    subfield_rank: String,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|i| {
            let &(inst, cntry) = rng.pick(INSTITUTIONS);
            let &(field, subfields) = rng.pick(FIELDS);
            let author = if rng.one_in(50) {
                String::new()
            } else {
                format!("{}, {}", rng.pick(LAST_NAMES), rng.pick(FIRST_NAMES))
            };
            // a few blanks and unparseable ranks, like the real export
            let subfield_rank = if rng.one_in(25) {
                "n/a".to_string()
            } else {
                (1 + rng.below(2000)).to_string()
            };
            Row {
                author,
                institution: if rng.one_in(40) { String::new() } else { inst.to_string() },
                country: if rng.one_in(40) { String::new() } else { cntry.to_string() },
                rank: i as i64 + 1,
                field: field.to_string(),
                subfield: rng.pick(subfields).to_string(),
                subfield_rank,
            }
        })
        .collect()
}

const HEADERS: [&str; 7] = [
    "authfull",
    "inst_name",
    "cntry",
    "rank (ns)",
    "sm-field",
    "sm-subfield-1",
    "rank sm-subfield-1",
];

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(HEADERS)?;
    for r in rows {
        writer.write_record([
            r.author.as_str(),
            r.institution.as_str(),
            r.country.as_str(),
            r.rank.to_string().as_str(),
            r.field.as_str(),
            r.subfield.as_str(),
            r.subfield_rank.as_str(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Empty strings become nulls, as Pandas would write them.
fn text_column<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from(
        values
            .map(|s| Some(s).filter(|s| !s.is_empty()))
            .collect::<Vec<_>>(),
    ))
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|name| {
                let dtype = if *name == "rank (ns)" { DataType::Int64 } else { DataType::Utf8 };
                Field::new(*name, dtype, true)
            })
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text_column(rows.iter().map(|r| r.author.as_str())),
            text_column(rows.iter().map(|r| r.institution.as_str())),
            text_column(rows.iter().map(|r| r.country.as_str())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.rank).collect::<Vec<_>>())) as ArrayRef,
            text_column(rows.iter().map(|r| r.field.as_str())),
            text_column(rows.iter().map(|r| r.subfield.as_str())),
            text_column(rows.iter().map(|r| r.subfield_rank.as_str())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sample_authors.csv")?;
    write_parquet(&rows, "sample_authors.parquet")?;

    println!(
        "Wrote {} authors to sample_authors.csv and sample_authors.parquet",
        rows.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_fixed_row_count_with_gaps() {
        let rows = generate(&mut SimpleRng::new(42));
        assert_eq!(rows.len(), ROWS);
        assert!(rows.iter().any(|r| r.author.is_empty()));
        assert!(rows.iter().any(|r| r.institution.is_empty()));
        assert!(rows.iter().any(|r| r.country.is_empty()));
        assert!(rows.iter().any(|r| r.subfield_rank == "n/a"));
        assert!(rows.iter().map(|r| r.rank).eq(1..=ROWS as i64));
    }

    #[test]
    fn same_seed_same_rows() {
        let a = generate(&mut SimpleRng::new(7));
        let b = generate(&mut SimpleRng::new(7));
        assert!(a.iter().zip(&b).all(|(x, y)| x.author == y.author && x.country == y.country));
    }

    #[test]
    fn csv_output_has_header_and_every_row() {
        let rows = generate(&mut SimpleRng::new(42));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authors.csv");
        write_csv(&rows, path.to_str().unwrap()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().iter().collect::<Vec<_>>(), HEADERS);
        assert_eq!(reader.records().count(), ROWS);
    }
}
