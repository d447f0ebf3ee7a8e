// Résumé domain: data model, structural validation, the versioned store and
// the holder for the résumé currently on display.

pub mod current;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;
