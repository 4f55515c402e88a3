use std::fs::File;

use clap::Parser;
use csv_feed::{Capture, Field, Row, SessionBuilder};
use memmap2::Mmap;

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,

    /// Number of bytes fed to the session at once
    #[arg(long, default_value_t = 4096)]
    feed_size: usize,

    /// Comma-separated zero-based indices of the columns to keep
    #[arg(long)]
    capture: Option<Capture>,

    /// Whether to pull rows one by one instead of by chunks
    #[arg(long)]
    one_row: bool,

    /// Whether to reject stray quotes
    #[arg(long)]
    strict: bool,

    /// Only count rows instead of printing them
    #[arg(short, long)]
    count: bool,
}

impl Args {
    fn tabs(&self) -> bool {
        self.path.ends_with(".tsv")
    }
}

fn print_row(writer: &mut csv::Writer<std::io::Stdout>, row: &Row) -> csv::Result<()> {
    writer.write_record(row.iter().map(Field::to_bytes))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let file = File::open(&args.path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let mut session = SessionBuilder::new()
        .tabs(args.tabs())
        .binary(true)
        .strict(args.strict)
        .build();

    if let Some(capture) = args.capture.clone() {
        session.replace_capture(capture);
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(std::io::stdout());
    let mut count: u64 = 0;

    for chunk in mmap.chunks(args.feed_size.max(1)) {
        session.feed(chunk)?;

        loop {
            let result = if args.one_row {
                session.parse_one_row()
            } else {
                session.parse()
            };

            let rows = match result {
                Ok(rows) => rows,
                Err(err) if err.is_end_of_buffer() => break,
                Err(err) => return Err(err.into()),
            };

            count += rows.len() as u64;

            if !args.count {
                for row in rows.iter() {
                    print_row(&mut writer, row)?;
                }
            }
        }
    }

    for row in session.close()? {
        count += 1;

        if !args.count {
            print_row(&mut writer, &row)?;
        }
    }

    writer.flush()?;

    if args.count {
        println!("{}", count);
    }

    Ok(())
}
