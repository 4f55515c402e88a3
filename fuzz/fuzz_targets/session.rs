#![no_main]

use libfuzzer_sys::fuzz_target;

use csv_feed::{Session, MAX_ROWS_PER_BATCH};

// First byte picks the feed size, the rest is CSV data.
fuzz_target!(|data: &[u8]| {
    let Some((&feed_size, data)) = data.split_first() else {
        return;
    };

    let mut session = Session::new();
    session.set_capture([1usize, 0, 7]).unwrap();

    for chunk in data.chunks(feed_size.max(1) as usize) {
        session.feed(chunk).unwrap();

        loop {
            match session.parse() {
                Ok(rows) => {
                    assert!(rows.len() <= MAX_ROWS_PER_BATCH);
                    assert!(rows.iter().all(|row| row.len() == 3));
                }
                Err(err) if err.is_end_of_buffer() => break,
                Err(err) => panic!("{}", err),
            }
        }
    }

    assert!(session.close().unwrap().len() <= 1);
});
