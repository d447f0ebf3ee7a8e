// Placeholder intake pipeline: PDF upload, text extraction, parsing and
// saving. Responses are canned; only request validation is real.

pub mod fixtures;
pub mod handlers;
