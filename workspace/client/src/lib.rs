//! Headless client core for the school administration app.
//!
//! Everything a form page needs, minus the rendering: the create/edit
//! record form state machine ([`form::RecordForm`]), the relation picker
//! ([`picker::RelationPicker`]), typed REST helpers per entity ([`sdk`]),
//! and the [`transport::RecordTransport`] seam the rest of it talks
//! through. A UI shell drives the form and renders its reactive state;
//! nothing in this crate depends on a UI toolkit.

pub mod form;
pub mod picker;
pub mod rest;
pub mod sdk;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use form::{CreateDefaults, FormError, FormMode, FormPhase, Navigation, RecordForm, SubmitResult};
pub use picker::{PickerOption, RelationPicker};
pub use rest::RestTransport;
pub use transport::{RecordTransport, TransportError};
