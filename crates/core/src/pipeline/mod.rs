pub mod analysis_result;
pub mod local_analysis;
pub mod remote_enrichment;
pub mod session;
