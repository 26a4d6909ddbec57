// Register test modules
pub mod simulator_tests;
