pub mod certificate_use_case;
pub mod ports;
