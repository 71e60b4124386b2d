//! Domain layer for plotkeeper: the plot service and its input validation.

pub mod plot;
