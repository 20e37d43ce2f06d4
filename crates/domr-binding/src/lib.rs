#![forbid(unsafe_code)]

//! Declarative data binding for domr.
//!
//! A [`Binding`] maps dotted property paths of a JSON model to DOM actions
//! under one root element, and only schedules work for values that changed
//! since its last render.

pub mod binding;

pub use binding::{Binding, CALLBACK_ID};
