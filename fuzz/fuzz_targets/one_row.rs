#![no_main]

use libfuzzer_sys::fuzz_target;

use csv_feed::{Field, Session};

// Pulling rows one by one must yield the same rows as pulling them by chunks.
fuzz_target!(|data: &[u8]| {
    fn collect(data: &[u8], one_row: bool) -> Vec<Vec<Field>> {
        let mut session = Session::new();
        let mut records = Vec::new();

        session.feed(data).unwrap();

        loop {
            let result = if one_row {
                session.parse_one_row()
            } else {
                session.parse()
            };

            match result {
                Ok(rows) => {
                    if one_row {
                        assert!(!rows.is_empty());
                    }

                    records.extend(rows);
                }
                Err(err) if err.is_end_of_buffer() => break,
                Err(err) => panic!("{}", err),
            }
        }

        records.extend(session.close().unwrap());
        records
    }

    assert_eq!(collect(data, true), collect(data, false));
});
