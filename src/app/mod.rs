pub mod ports;
pub mod enrich_use_case;
pub mod browse_use_case;
pub mod curate_use_case;
