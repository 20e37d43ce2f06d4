#![no_main]
//! Arbitrary config and data JSON through a binding over the in-memory DOM.
//!
//! Input is split at the first NUL byte: config JSON before, data JSON after.
//! Parse failures and bind errors are fine; panics are not.

use std::rc::Rc;

use domr_actions::ActionRegistry;
use domr_binding::Binding;
use domr_core::BindingConfig;
use domr_harness::{Node, Outlet};
use domr_runtime::{Batcher, UnavailableTicker};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(split) = data.iter().position(|&b| b == 0) else {
        return;
    };
    let Ok(config) = serde_json::from_slice::<serde_json::Value>(&data[..split]) else {
        return;
    };
    let Ok(config) = BindingConfig::from_value(config) else {
        return;
    };
    let Ok(model) = serde_json::from_slice::<serde_json::Value>(&data[split + 1..]) else {
        return;
    };

    let outlet = Outlet::new();
    let batcher: Batcher<Node> = Batcher::new(Rc::new(UnavailableTicker));
    let mut binding = Binding::with_parts(
        outlet.root.clone(),
        config,
        batcher.clone(),
        Rc::new(ActionRegistry::builtin()),
    );

    let first = binding.render(&model);
    batcher.flush();
    assert!(batcher.is_empty());

    // Unchanged data never queues again.
    if first.is_ok() {
        assert!(binding.render(&model).is_ok());
        assert_eq!(batcher.pending_count(), 0);
    }
    binding.destroy();
    assert_eq!(batcher.flush().executed, 0);
});
