use std::fs::File;

use clap::Parser;
use csv_feed::{Field, Session, SessionBuilder};
use memmap2::Mmap;

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,

    /// Number of bytes fed to the session at once
    #[arg(long, default_value_t = 1000)]
    feed_size: usize,
}

fn drain(session: &mut Session, records: &mut Vec<Vec<Vec<u8>>>) -> csv_feed::Result<()> {
    loop {
        match session.parse() {
            Ok(rows) => records.extend(
                rows.iter()
                    .map(|row| row.iter().map(|field| field.to_bytes().into_owned()).collect()),
            ),
            Err(err) if err.is_end_of_buffer() => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

// Checks that feeding a file chunk by chunk yields the same records as the
// `csv` crate reading it in one go.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let delimiter = if args.path.ends_with(".tsv") {
        b'\t'
    } else {
        b','
    };

    let file = File::open(&args.path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let mut session = SessionBuilder::new()
        .delimiter(delimiter)
        .binary(true)
        .build();
    let mut records = Vec::new();

    for chunk in mmap.chunks(args.feed_size.max(1)) {
        session.feed(chunk)?;
        drain(&mut session, &mut records)?;
    }

    records.extend(
        session
            .close()?
            .iter()
            .map(|row| row.iter().map(|field| field.to_bytes().into_owned()).collect()),
    );

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(&mmap[..]);
    let mut record = csv::ByteRecord::new();
    let mut index: usize = 0;

    while reader.read_byte_record(&mut record)? {
        let expected = record.iter().collect::<Vec<_>>();

        match records.get(index) {
            Some(actual) if actual.iter().map(Vec::as_slice).eq(expected.iter().copied()) => {}
            other => {
                anyhow::bail!(
                    "record {} differs: expected {:?}, got {:?}",
                    index,
                    expected
                        .iter()
                        .map(|cell| bstr::BStr::new(cell))
                        .collect::<Vec<_>>(),
                    other.map(|cells| cells
                        .iter()
                        .map(|cell| Field::Binary(cell.clone()))
                        .collect::<Vec<_>>())
                );
            }
        }

        index += 1;
    }

    if index != records.len() {
        anyhow::bail!("expected {} records, got {}", index, records.len());
    }

    println!("{} records match", index);

    Ok(())
}
