pub mod transient_detector;
