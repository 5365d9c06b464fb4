use super::*;
use common::PAGE_SIZE as DEFAULT_PAGE_SIZE;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn cache_with(cache_pages: usize, max_open: usize) -> Cache {
    Cache::new(
        CacheConfig::builder()
            .cache_pages(cache_pages)
            .max_open(max_open)
            .build(),
    )
}

#[test]
fn write_read_within_one_page_round_trips_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.bin");
    let cache = cache_with(4, 8);

    let fd = cache.open(&path).unwrap();
    assert_eq!(cache.write(fd, b"hello").unwrap(), 5);
    assert_eq!(cache.seek(fd, 0, Whence::Set).unwrap(), 0);

    let mut buf = [0u8; 5];
    assert_eq!(cache.read(fd, &mut buf).unwrap(), 5);
    assert_eq!(&buf, b"hello");

    cache.fsync(fd).unwrap();
    cache.close(fd).unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk.len(), DEFAULT_PAGE_SIZE);
    assert_eq!(&on_disk[0..5], b"hello");
    assert!(on_disk[5..].iter().all(|&b| b == 0));
}

#[test]
fn cross_page_write_touches_exactly_two_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("b.bin");
    let cache = cache_with(4, 8);
    let page_size = DEFAULT_PAGE_SIZE as u64;

    let fd = cache.open(&path).unwrap();
    cache.seek(fd, page_size as i64 - 2, Whence::Set).unwrap();
    assert_eq!(cache.write(fd, b"ABCD").unwrap(), 4);

    cache.seek(fd, page_size as i64 - 2, Whence::Set).unwrap();
    let mut buf = [0u8; 4];
    cache.read(fd, &mut buf).unwrap();
    assert_eq!(&buf, b"ABCD");

    cache.fsync(fd).unwrap();
    cache.close(fd).unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk.len() as u64, 2 * page_size);
    assert_eq!(&on_disk[page_size as usize - 2..page_size as usize + 2], b"ABCD");
}

#[test]
fn eviction_correctness_over_128_pages_with_64_page_cache() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("c.bin");
    let cache = cache_with(64, 4);
    let page_size = DEFAULT_PAGE_SIZE as u64;

    let fd = cache.open(&path).unwrap();
    for i in 0..128u64 {
        cache.seek(fd, (i * page_size) as i64, Whence::Set).unwrap();
        cache.write(fd, &[i as u8]).unwrap();
    }
    cache.fsync(fd).unwrap();

    // Reopen to force every read through a cold cache.
    cache.close(fd).unwrap();
    let fd = cache.open(&path).unwrap();
    for i in 0..128u64 {
        cache.seek(fd, (i * page_size) as i64, Whence::Set).unwrap();
        let mut buf = [0u8; 1];
        cache.read(fd, &mut buf).unwrap();
        assert_eq!(buf[0], i as u8, "mismatch at page {i}");
    }
    cache.close(fd).unwrap();
}

#[test]
fn read_past_end_of_file_returns_zero_filled_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("d.bin");
    let cache = cache_with(4, 4);

    let fd = cache.open(&path).unwrap();
    cache.write(fd, b"abc").unwrap();
    cache.seek(fd, 0, Whence::Set).unwrap();

    let mut buf = [0xFFu8; 10];
    let n = cache.read(fd, &mut buf).unwrap();
    assert_eq!(n, 10);
    assert_eq!(&buf[0..3], b"abc");
    assert!(buf[3..].iter().all(|&b| b == 0));
}

#[test]
fn seek_whence_variants() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e.bin");
    let cache = cache_with(4, 4);
    let page_size = DEFAULT_PAGE_SIZE as u64;

    let fd = cache.open(&path).unwrap();
    cache.write(fd, b"0123456789").unwrap();

    assert_eq!(cache.seek(fd, 3, Whence::Set).unwrap(), 3);
    assert_eq!(cache.seek(fd, 2, Whence::Cur).unwrap(), 5);

    // `End` queries the OS file size directly, not the cache's logical
    // view; before any flush the underlying file is still empty.
    assert_eq!(cache.seek(fd, 0, Whence::End).unwrap(), 0);

    // Flushing pads the dirty page out to a full page, so the on-disk
    // size `End` now reports is `page_size`, not the 10 logical bytes
    // written.
    cache.fsync(fd).unwrap();
    assert_eq!(cache.seek(fd, 0, Whence::End).unwrap(), page_size);
    assert_eq!(cache.seek(fd, -4, Whence::End).unwrap(), page_size - 4);
}

#[test]
fn seek_to_negative_position_is_invalid_argument() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("f.bin");
    let cache = cache_with(4, 4);

    let fd = cache.open(&path).unwrap();
    let err = cache.seek(fd, -1, Whence::Set).unwrap_err();
    assert!(matches!(err, CacheError::InvalidArgument(_)));
}

#[test]
fn seeking_past_end_then_writing_extends_file_on_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("g.bin");
    let cache = cache_with(4, 4);
    let page_size = DEFAULT_PAGE_SIZE as i64;

    let fd = cache.open(&path).unwrap();
    cache.seek(fd, page_size, Whence::Set).unwrap();
    cache.write(fd, b"late").unwrap();
    cache.fsync(fd).unwrap();
    cache.close(fd).unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk.len() as i64, 2 * page_size);
    assert_eq!(&on_disk[page_size as usize..page_size as usize + 4], b"late");
}

#[test]
fn opening_more_than_max_open_yields_too_many_open() {
    let dir = tempdir().unwrap();
    let cache = cache_with(4, 4);

    let mut fds = Vec::new();
    for i in 0..4 {
        let path = dir.path().join(format!("h{i}.bin"));
        fds.push(cache.open(&path).unwrap());
    }

    let overflow_path = dir.path().join("overflow.bin");
    let err = cache.open(&overflow_path).unwrap_err();
    assert!(matches!(err, CacheError::TooManyOpen));

    for fd in fds {
        cache.close(fd).unwrap();
    }
}

#[test]
fn descriptors_are_distinct_and_in_range() {
    let dir = tempdir().unwrap();
    let cache = cache_with(4, 8);

    let mut fds = Vec::new();
    for i in 0..5 {
        let path = dir.path().join(format!("i{i}.bin"));
        let fd = cache.open(&path).unwrap();
        assert!((0..8).contains(&fd));
        assert!(!fds.contains(&fd));
        fds.push(fd);
    }
    for fd in fds {
        cache.close(fd).unwrap();
    }
}

#[test]
fn closed_descriptor_is_bad_descriptor_for_every_operation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("j.bin");
    let cache = cache_with(4, 4);

    let fd = cache.open(&path).unwrap();
    cache.close(fd).unwrap();

    assert!(matches!(
        cache.read(fd, &mut [0u8; 1]).unwrap_err(),
        CacheError::BadDescriptor
    ));
    assert!(matches!(
        cache.write(fd, &[0u8]).unwrap_err(),
        CacheError::BadDescriptor
    ));
    assert!(matches!(
        cache.seek(fd, 0, Whence::Set).unwrap_err(),
        CacheError::BadDescriptor
    ));
    assert!(matches!(cache.fsync(fd).unwrap_err(), CacheError::BadDescriptor));
    assert!(matches!(cache.close(fd).unwrap_err(), CacheError::BadDescriptor));
}

#[test]
fn fsync_durability_across_close_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("k.bin");
    let cache = cache_with(64, 4);
    let page_size = DEFAULT_PAGE_SIZE as i64;

    let fd = cache.open(&path).unwrap();
    for i in 0..10u8 {
        cache.seek(fd, i as i64 * page_size, Whence::Set).unwrap();
        cache.write(fd, &vec![i; DEFAULT_PAGE_SIZE]).unwrap();
    }
    cache.fsync(fd).unwrap();
    cache.close(fd).unwrap();

    let fd = cache.open(&path).unwrap();
    for i in 0..10u8 {
        cache.seek(fd, i as i64 * page_size, Whence::Set).unwrap();
        let mut buf = vec![0u8; DEFAULT_PAGE_SIZE];
        cache.read(fd, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == i));
    }
    cache.close(fd).unwrap();
}

#[test]
fn concurrent_descriptors_each_see_their_own_writes() {
    use std::thread;

    let dir = tempdir().unwrap();
    let cache = std::sync::Arc::new(cache_with(8, 8));

    let mut handles = Vec::new();
    for t in 0..2u8 {
        let cache = cache.clone();
        let path = dir.path().join(format!("thread-{t}.bin"));
        handles.push(thread::spawn(move || {
            let fd = cache.open(&path).unwrap();
            let mut last = [0u8; 8];
            for i in 0..1000u64 {
                let byte = (t as u64 * 1000 + i) as u8;
                cache.seek(fd, 0, Whence::Set).unwrap();
                let record = [byte; 8];
                cache.write(fd, &record).unwrap();
                cache.seek(fd, 0, Whence::Set).unwrap();
                cache.read(fd, &mut last).unwrap();
                assert_eq!(last, record);
            }
            cache.fsync(fd).unwrap();
            cache.close(fd).unwrap();
            last
        }));
    }

    for (t, handle) in handles.into_iter().enumerate() {
        let last = handle.join().unwrap();
        let expected = (t as u64 * 1000 + 999) as u8;
        assert!(last.iter().all(|&b| b == expected));
    }
}

#[test]
fn global_free_function_api_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("global.bin");

    let fd = crate::open(&path);
    assert!(fd >= 0);
    assert_eq!(crate::write(fd, b"xy"), 2);
    assert_eq!(crate::seek(fd, 0, Whence::Set), 0);
    let mut buf = [0u8; 2];
    assert_eq!(crate::read(fd, &mut buf), 2);
    assert_eq!(&buf, b"xy");
    assert_eq!(crate::fsync(fd), 0);
    assert_eq!(crate::close(fd), 0);
    assert_eq!(crate::close(fd), -1);
}
