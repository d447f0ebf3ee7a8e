// AI résumé optimization: prompt construction, the blocking and streaming
// optimization flows, and their HTTP handlers.

pub mod handlers;
pub mod optimizer;
pub mod prompts;
