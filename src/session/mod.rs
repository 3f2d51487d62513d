/// The per-lake view session.
pub mod lake_view;
