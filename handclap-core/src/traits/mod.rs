pub mod capture_observer;
pub mod capture_stream;
pub mod device_enumerator;
