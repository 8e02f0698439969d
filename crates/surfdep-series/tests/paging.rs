//! Paging behavior observed through instrumented stores.

use surfdep_series::{BackgroundStore, PagedSeries, SeriesError, StoreError};
use surfdep_test_utils::{FailingStore, RecordingStore, StoreEvent};

#[test]
fn store_sees_whole_pages_in_order() {
    let store = RecordingStore::new();
    let log = store.log();
    let mut series = PagedSeries::new(store, 4).unwrap();
    for i in 0..17 {
        series.append(f64::from(i)).unwrap();
    }
    assert_eq!(series.get(0).unwrap(), 0.0);
    assert_eq!(series.get(16).unwrap(), 16.0);

    let events = log.lock().unwrap().clone();
    let mut expected = vec![StoreEvent::Open];
    for page in 0..5 {
        expected.push(StoreEvent::Push { page, len: 4 });
    }
    expected.push(StoreEvent::Pull { page: 0 });
    expected.push(StoreEvent::Pull { page: 4 });
    assert_eq!(events, expected);
}

#[test]
fn close_flushes_then_closes() {
    let store = RecordingStore::new();
    let log = store.log();
    let mut series = PagedSeries::new(store, 8).unwrap();
    series.append(1.0).unwrap();
    series.close().unwrap();
    let events = log.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            StoreEvent::Open,
            StoreEvent::Push { page: 0, len: 8 },
            StoreEvent::Close,
        ]
    );
}

#[test]
fn failed_page_out_keeps_resident_values() {
    let mut series = PagedSeries::new(FailingStore::new(1), 4).unwrap();
    for i in 0..8 {
        series.append(f64::from(i)).unwrap();
    }
    match series.append(8.0) {
        Err(SeriesError::Store(StoreError::Io(_))) => {}
        other => panic!("expected Io failure, got {other:?}"),
    }
    assert_eq!(series.len(), 8);
    // Page 1 is still resident and intact.
    assert_eq!(series.get(5).unwrap(), 5.0);
    assert_eq!(series.resident_page(), Some(1));
}

#[test]
fn clear_reaches_the_store() {
    let store = RecordingStore::new();
    let log = store.log();
    let mut series = PagedSeries::new(store, 2).unwrap();
    for i in 0..5 {
        series.append(f64::from(i)).unwrap();
    }
    series.clear().unwrap();
    assert!(series.is_empty());
    assert_eq!(log.lock().unwrap().last(), Some(&StoreEvent::Clear));
    // Old pages are gone: the first page after clear is fresh, not pulled.
    series.append(3.0).unwrap();
    series.append(4.0).unwrap();
    series.append(5.0).unwrap();
    assert_eq!(series.get(0).unwrap(), 3.0);
}

#[test]
fn background_write_failure_is_never_read_as_missing_data() {
    let store = BackgroundStore::spawn(FailingStore::new(0)).unwrap();
    let mut series = PagedSeries::new(store, 2).unwrap();
    // Crossing into page 1 hands page 0 to the worker, which fails it.
    for i in 0..3 {
        series.append(f64::from(i)).unwrap();
    }
    for _ in 0..3 {
        match series.get(0) {
            Err(SeriesError::Store(StoreError::PushFailed { page: 0, .. })) => {}
            other => panic!("expected PushFailed, got {other:?}"),
        }
    }
    match series.flush() {
        Err(SeriesError::Store(StoreError::PushFailed { page: 0, .. })) => {}
        other => panic!("expected PushFailed, got {other:?}"),
    }

    // Clearing discards the failed pages and the failure with them.
    series.clear().unwrap();
    assert!(series.is_empty());
    series.append(1.0).unwrap();
    assert_eq!(series.get(0).unwrap(), 1.0);
}

#[test]
fn flush_reports_a_failed_final_write() {
    let store = BackgroundStore::spawn(FailingStore::new(0)).unwrap();
    let mut series = PagedSeries::new(store, 8).unwrap();
    series.append(1.0).unwrap();
    match series.flush() {
        Err(SeriesError::Store(StoreError::PushFailed { page: 0, detail })) => {
            assert!(detail.contains("injected failure"), "{detail}");
        }
        other => panic!("expected PushFailed, got {other:?}"),
    }
    assert!(series.close().is_err());
}
