use array_table::{ArrayError, BoundedArray};
use std::cell::RefCell;
use std::rc::Rc;

// Test: an array over a shifted range addresses slots by `i - low`.
#[test]
fn shifted_range_addressing() {
    let mut a = BoundedArray::new(100, 104).unwrap();
    a.set(Some("first"), 100);
    a.set(Some("last"), 104);
    assert_eq!(a.get(100), Some(&"first"));
    assert_eq!(a.get(104), Some(&"last"));
    assert_eq!(a.get(102), None);
    assert_eq!(
        a.iter().filter(|(_, v)| v.is_some()).map(|(i, _)| i).collect::<Vec<_>>(),
        vec![100, 104]
    );
}

// Test: the release callback sees overwritten items at overwrite time and
// remaining items at destruction, never moved ones.
#[test]
fn release_callback_lifecycle() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let mut a = BoundedArray::with_release(0, 3, move |v: u32| sink.borrow_mut().push(v)).unwrap();
    for i in 0..4 {
        a.set(Some(i as u32), i);
    }
    a.set(Some(10), 0);
    assert_eq!(*log.borrow(), vec![0]);

    let moved = a.take(3).unwrap();
    a.replace(2, moved);
    assert_eq!(*log.borrow(), vec![0], "moves must not release");

    a.destroy();
    let mut all = log.borrow().clone();
    all.sort();
    // 2 was displaced by `replace`, which hands it back instead of releasing.
    assert_eq!(all, vec![0, 1, 3, 10]);
}

#[test]
fn print_layout_for_strings() {
    let mut a = BoundedArray::new(1, 4).unwrap();
    a.set(Some("x".to_string()), 2);
    a.set(Some("y".to_string()), 4);
    let rendered = a.render(|s, f| f.write_str(s)).to_string();
    assert_eq!(rendered, "[  [], [x],  [], [y] ]");
}

// Test: a range too large to allocate.
// Verifies: allocation failure comes back as `ArrayError::Alloc`, not an abort.
#[test]
fn allocation_failure_is_an_error_value() {
    let err = BoundedArray::<[u8; 64]>::new(0, isize::MAX - 1).unwrap_err();
    assert!(matches!(err, ArrayError::Alloc(_)), "got {err:?}");
    assert!(err.to_string().starts_with("array allocation failed"));
}

#[test]
fn create_errors_are_values() {
    let err = BoundedArray::<u8>::new(1, 0).unwrap_err();
    assert_eq!(err, ArrayError::InvalidBounds { low: 1, high: 0 });
    assert_eq!(err.to_string(), "invalid array bounds: [1, 0]");
}
