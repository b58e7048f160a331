// Search engine: raw postings in, ranked caller-facing postings out.
// Everything below `handlers` is synchronous and free of I/O.

pub mod attributes;
pub mod dedup;
pub mod filters;
pub mod fuzzy;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod sponsorship;
pub mod text;
