#![no_main]
//! Random push/cancel/flush/reset sequences against the batcher.
//!
//! Invariants checked after every step:
//! - at most one pending task per (element, id);
//! - a flush leaves nothing queued unless an executor pushed during it;
//! - each flushed identity ran exactly once, with its newest payload.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use arbitrary::Arbitrary;
use domr_core::{GroupId, Task};
use domr_runtime::{Batcher, UnavailableTicker};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Push { element: u8, id: u8, group: bool, payload: u16 },
    Cancel { group: bool },
    Flush,
    Reset,
}

fuzz_target!(|ops: Vec<Op>| {
    let batcher: Batcher<u8> = Batcher::new(Rc::new(UnavailableTicker));
    let groups = [GroupId::next(), GroupId::next()];
    let ran: Rc<RefCell<Vec<((u8, u8), u16)>>> = Rc::default();
    let mut expected: HashMap<(u8, u8), u16> = HashMap::new();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Push { element, id, group, payload } => {
                let element = element % 8;
                let id = id % 4;
                let r = Rc::clone(&ran);
                let task = Task::new(element, format!("id-{id}"), move |_: &Task<u8>| {
                    r.borrow_mut().push(((element, id), payload));
                })
                .with_group(groups[usize::from(group)]);
                batcher.push(task);
                expected.insert((element, id), payload);
            }
            Op::Cancel { group } => {
                batcher.cancel(groups[usize::from(group)]);
                // Only uniqueness is checked for this round.
                expected.clear();
            }
            Op::Flush => {
                ran.borrow_mut().clear();
                batcher.flush();
                assert!(batcher.is_empty());
                let ran = ran.borrow();
                let mut seen = HashMap::new();
                for &(key, payload) in ran.iter() {
                    assert!(seen.insert(key, payload).is_none(), "identity ran twice");
                }
                for (key, payload) in &expected {
                    assert_eq!(seen.get(key), Some(payload));
                }
                expected.clear();
            }
            Op::Reset => {
                batcher.reset();
                assert!(batcher.is_empty());
                expected.clear();
            }
        }
        assert!(batcher.pending_count() <= 8 * 4);
    }
});
